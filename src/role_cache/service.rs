//! # Role Cache Service
//!
//! A read-through, in-process snapshot of the role set.
//!
//! ## Lifecycle
//!
//! ```text
//! cold --init ok--> warm --refresh ok--> warm (next generation)
//!   |                 \--refresh err--> warm (unchanged)
//!   \--init err--> cold (permanently; init is never retried)
//! ```
//!
//! Lookups never touch the source. They read whichever snapshot is current;
//! refreshes build the next snapshot off to the side and swap it in whole, so
//! a reader sees either the old set or the new one and never a mix.

use super::error::CacheError;
use super::reader::RoleReader;
use crate::model::{Role, RoleName};
use mediator::Context;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Refresh cadence when none is configured: once a day.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest accepted refresh cadence. Longer intervals are clamped to it.
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// One immutable, fully indexed copy of the role set.
///
/// Both views always hold the same roles. When the source repeats a name or
/// an id, the later role wins and the one it supersedes is dropped from both
/// views.
#[derive(Debug, Default)]
pub struct RoleSnapshot {
    generation: u64,
    by_name: HashMap<RoleName, Role>,
    by_id: HashMap<u32, Role>,
}

impl RoleSnapshot {
    /// Indexes `roles` by name and by id.
    fn from_roles(roles: Vec<Role>) -> Self {
        let mut snapshot = Self::default();
        for role in roles {
            if let Some(previous) = snapshot.by_name.insert(role.name, role.clone()) {
                warn!(name = %role.name, previous_id = previous.id, id = role.id, "Duplicate role name in source");
                if previous.id != role.id
                    && snapshot.by_id.get(&previous.id).map(|r| r.name) == Some(previous.name)
                {
                    snapshot.by_id.remove(&previous.id);
                }
            }
            if let Some(previous) = snapshot.by_id.insert(role.id, role.clone()) {
                warn!(id = role.id, previous = %previous.name, name = %role.name, "Duplicate role id in source");
                if previous.name != role.name
                    && snapshot.by_name.get(&previous.name).map(|r| r.id) == Some(previous.id)
                {
                    snapshot.by_name.remove(&previous.name);
                }
            }
        }
        snapshot
    }

    /// Starts at 1 for the initial load and increases with every swap.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn role_by_name(&self, name: RoleName) -> Option<&Role> {
        self.by_name.get(&name)
    }

    pub fn role_by_id(&self, id: u32) -> Option<&Role> {
        self.by_id.get(&id)
    }

    /// Number of distinct role ids held.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses_uninitialized: u64,
    pub misses_not_found: u64,
    pub refresh_success: u64,
    pub refresh_failed: u64,
    pub roles_loaded: u64,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses_uninitialized: AtomicU64,
    misses_not_found: AtomicU64,
    refresh_success: AtomicU64,
    refresh_failed: AtomicU64,
    roles_loaded: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

struct Inner {
    reader: Arc<dyn RoleReader>,
    refresh_interval: Duration,
    snapshot: RwLock<Option<Arc<RoleSnapshot>>>,
    init: OnceCell<Result<(), CacheError>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    shutdown: Context,
    counters: Counters,
}

impl Inner {
    fn current(&self) -> Option<Arc<RoleSnapshot>> {
        self.snapshot.read().clone()
    }

    /// Initial load, then the refresh task on success.
    async fn initialize(self: &Arc<Self>, ctx: &Context) -> Result<(), CacheError> {
        info!("Loading roles into cache");
        match self.load(ctx).await {
            Ok(count) => {
                info!(count, "Initial roles loaded into cache");
                self.start_refresh(ctx.child());
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed initial load of roles into cache");
                Err(e)
            }
        }
    }

    fn start_refresh(self: &Arc<Self>, ctx: Context) {
        info!(
            interval_secs = self.refresh_interval.as_secs(),
            "Starting role cache refresh"
        );
        let handle = tokio::spawn(refresh_loop(Arc::clone(self), ctx));
        *self.refresh_task.lock() = Some(handle);
    }

    /// Fetches the full role set and swaps it in. On failure the current
    /// snapshot is left as it was.
    async fn load(&self, ctx: &Context) -> Result<usize, CacheError> {
        let roles = self
            .reader
            .get_all_roles(ctx)
            .await
            .map_err(|e| CacheError::SourceUnavailable(e.to_string()))?;

        let mut next = RoleSnapshot::from_roles(roles);
        let count = next.len();

        let mut current = self.snapshot.write();
        next.generation = current.as_ref().map_or(1, |s| s.generation + 1);
        let generation = next.generation;
        *current = Some(Arc::new(next));
        drop(current);

        self.counters
            .roles_loaded
            .store(count as u64, Ordering::Relaxed);
        debug!(count, generation, "Role snapshot swapped");
        Ok(count)
    }

    async fn refresh(&self, ctx: &Context) {
        info!("Refreshing role cache");
        match self.load(ctx).await {
            Ok(count) => {
                bump(&self.counters.refresh_success);
                info!(count, "Role cache refreshed");
            }
            Err(e) => {
                bump(&self.counters.refresh_failed);
                error!(error = %e, "Failed to refresh role cache; keeping previous roles");
            }
        }
    }
}

async fn refresh_loop(inner: Arc<Inner>, ctx: Context) {
    let period = inner.refresh_interval;
    // The initial load already ran, so the first tick is one full period out.
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                info!("Stopping role cache refresh: context cancelled");
                break;
            }
            _ = inner.shutdown.cancelled() => {
                info!("Stopping role cache refresh: stop requested");
                break;
            }
            _ = ticker.tick() => {
                tokio::select! {
                    biased;
                    _ = ctx.cancelled() => break,
                    _ = inner.shutdown.cancelled() => break,
                    _ = inner.refresh(&ctx) => {}
                }
            }
        }
    }
    debug!("Role cache refresh loop exited");
}

/// Read-through cache of the role set with periodic background refresh.
///
/// Cloning is cheap; clones share the same snapshot and refresh task.
#[derive(Clone)]
pub struct RoleCacheService {
    inner: Arc<Inner>,
}

impl RoleCacheService {
    pub fn new(reader: Arc<dyn RoleReader>, refresh_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                reader,
                refresh_interval: refresh_interval.clamp(MIN_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL),
                snapshot: RwLock::new(None),
                init: OnceCell::new(),
                refresh_task: Mutex::new(None),
                shutdown: Context::new(),
                counters: Counters::default(),
            }),
        }
    }

    /// A cache that refreshes on [`DEFAULT_REFRESH_INTERVAL`].
    pub fn with_default_interval(reader: Arc<dyn RoleReader>) -> Self {
        Self::new(reader, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_interval
    }

    /// Performs the initial load and, if it succeeds, starts the refresh task.
    ///
    /// Runs at most once per instance. Every caller, concurrent or later,
    /// receives the outcome of that single attempt. A failed initial load
    /// leaves the cache cold for good and no refresh task is started.
    ///
    /// The load runs in its own task, so a caller that is dropped mid-load
    /// does not abandon it and later callers still share its outcome.
    ///
    /// The refresh task stops when `ctx` is cancelled or [`stop`](Self::stop)
    /// is called.
    pub async fn init_and_start_refresh(&self, ctx: &Context) -> Result<(), CacheError> {
        if let Some(outcome) = self.inner.init.get() {
            return outcome.clone();
        }

        let inner = Arc::clone(&self.inner);
        let ctx = ctx.clone();
        let task = tokio::spawn(async move {
            inner
                .init
                .get_or_init(|| inner.initialize(&ctx))
                .await
                .clone()
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Role cache initialization task ended abnormally");
                Err(CacheError::SourceUnavailable(format!(
                    "initialization task failed: {e}"
                )))
            }
        }
    }

    /// Signals the refresh task to exit and waits for it. Safe to call more
    /// than once, and before initialization.
    pub async fn stop(&self) {
        self.inner.shutdown.cancel();
        let handle = self.inner.refresh_task.lock().take();
        if let Some(handle) = handle {
            info!("Signaling role cache refresh task to stop");
            if let Err(e) = handle.await {
                error!(error = %e, "Role cache refresh task ended abnormally");
            }
            info!("Role cache refresh task stopped");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.snapshot.read().is_some()
    }

    /// The current snapshot, for callers that need several consistent lookups.
    pub fn snapshot(&self) -> Option<Arc<RoleSnapshot>> {
        self.inner.current()
    }

    pub fn get_role_by_name(&self, name: RoleName) -> Result<Role, CacheError> {
        let snapshot = self.require_snapshot()?;
        match snapshot.role_by_name(name) {
            Some(role) => {
                bump(&self.inner.counters.hits);
                Ok(role.clone())
            }
            None => {
                bump(&self.inner.counters.misses_not_found);
                Err(CacheError::RoleNameNotFound(name))
            }
        }
    }

    pub fn get_role_by_id(&self, id: u32) -> Result<Role, CacheError> {
        let snapshot = self.require_snapshot()?;
        match snapshot.role_by_id(id) {
            Some(role) => {
                bump(&self.inner.counters.hits);
                Ok(role.clone())
            }
            None => {
                bump(&self.inner.counters.misses_not_found);
                Err(CacheError::RoleIdNotFound(id))
            }
        }
    }

    fn require_snapshot(&self) -> Result<Arc<RoleSnapshot>, CacheError> {
        self.inner.current().ok_or_else(|| {
            bump(&self.inner.counters.misses_uninitialized);
            CacheError::NotInitialized
        })
    }

    pub fn stats(&self) -> CacheStats {
        let c = &self.inner.counters;
        CacheStats {
            hits: c.hits.load(Ordering::Relaxed),
            misses_uninitialized: c.misses_uninitialized.load(Ordering::Relaxed),
            misses_not_found: c.misses_not_found.load(Ordering::Relaxed),
            refresh_success: c.refresh_success.load(Ordering::Relaxed),
            refresh_failed: c.refresh_failed.load(Ordering::Relaxed),
            roles_loaded: c.roles_loaded.load(Ordering::Relaxed),
            generation: self.inner.current().map_or(0, |s| s.generation),
        }
    }
}

impl std::fmt::Debug for RoleCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleCacheService")
            .field("refresh_interval", &self.inner.refresh_interval)
            .field("stats", &self.stats())
            .finish()
    }
}
