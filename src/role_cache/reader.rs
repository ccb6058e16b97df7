//! # Role Source
//!
//! The cache's only dependency on the outside world: one call that returns
//! the complete current role set. Persistence-backed readers live with the
//! excluded storage layer; [`InMemoryRoleReader`] serves wiring and tests.

use crate::model::{Role, RoleName};
use async_trait::async_trait;
use mediator::Context;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

/// Boxed error returned by role sources.
pub type ReaderError = Box<dyn std::error::Error + Send + Sync>;

/// Read access to the authoritative role set.
#[async_trait]
pub trait RoleReader: Send + Sync + 'static {
    /// Fetches every role. Never partial: either the full set or an error.
    async fn get_all_roles(&self, ctx: &Context) -> Result<Vec<Role>, ReaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InMemoryReaderError {
    #[error("role source unavailable")]
    Unavailable,
    #[error("request cancelled")]
    Cancelled,
}

/// A [`RoleReader`] over a role list held in memory.
///
/// The list can be replaced and outages simulated while the reader is in use.
#[derive(Debug, Default)]
pub struct InMemoryRoleReader {
    roles: RwLock<Vec<Role>>,
    unavailable: AtomicBool,
    fetches: AtomicUsize,
}

impl InMemoryRoleReader {
    pub fn new(roles: Vec<Role>) -> Self {
        Self {
            roles: RwLock::new(roles),
            ..Self::default()
        }
    }

    /// The role set every deployment is seeded with.
    pub fn with_default_roles() -> Self {
        Self::new(default_roles())
    }

    /// Replaces the role set returned by subsequent fetches.
    pub fn set_roles(&self, roles: Vec<Role>) {
        *self.roles.write() = roles;
    }

    /// While `true`, every fetch fails with [`InMemoryReaderError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of fetches attempted, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleReader for InMemoryRoleReader {
    async fn get_all_roles(&self, ctx: &Context) -> Result<Vec<Role>, ReaderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if ctx.is_cancelled() {
            return Err(InMemoryReaderError::Cancelled.into());
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(InMemoryReaderError::Unavailable.into());
        }
        let roles = self.roles.read().clone();
        debug!(count = roles.len(), "Fetched roles");
        Ok(roles)
    }
}

pub fn default_roles() -> Vec<Role> {
    vec![
        Role::new(1, RoleName::Poster).with_description("Posts tasks for others to take on"),
        Role::new(2, RoleName::Tasker).with_description("Takes on posted tasks"),
        Role::new(3, RoleName::Admin).with_description("Manages users and content"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_current_roles_and_counts_fetches() {
        let reader = InMemoryRoleReader::with_default_roles();
        let ctx = Context::new();

        assert_eq!(reader.get_all_roles(&ctx).await.unwrap().len(), 3);

        reader.set_roles(vec![Role::new(9, RoleName::Admin)]);
        let roles = reader.get_all_roles(&ctx).await.unwrap();
        assert_eq!(roles, vec![Role::new(9, RoleName::Admin)]);
        assert_eq!(reader.fetch_count(), 2);
    }

    #[tokio::test]
    async fn simulated_outage_fails_fetches() {
        let reader = InMemoryRoleReader::with_default_roles();
        reader.set_unavailable(true);

        let err = reader.get_all_roles(&Context::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "role source unavailable");

        reader.set_unavailable(false);
        assert!(reader.get_all_roles(&Context::new()).await.is_ok());
    }

    #[tokio::test]
    async fn cancelled_context_fails_fetches() {
        let reader = InMemoryRoleReader::with_default_roles();
        let ctx = Context::new();
        ctx.cancel();

        assert!(reader.get_all_roles(&ctx).await.is_err());
    }
}
