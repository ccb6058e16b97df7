use crate::commands::{RegisterUser, RegisterUserHandler, UpdateUserProfile, UpdateUserProfileHandler};
use crate::config::AppConfig;
use crate::queries::{GetUserProfile, GetUserProfileHandler};
use crate::repository::UserRepository;
use crate::role_cache::{CacheError, RoleCacheService, RoleReader};
use mediator::{CommandBus, Context, MediatorError, QueryBus};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Reasons the service refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("role cache failed to initialize: {0}")]
    RoleCache(#[from] CacheError),

    #[error("handler registration failed: {0}")]
    Registration(#[from] MediatorError),
}

/// The running users service.
///
/// `UsersSystem` is responsible for:
/// - **Startup ordering**: the role cache is warm before any handler can run
/// - **Wiring**: every handler is bound on its bus exactly once
/// - **Shutdown**: background refresh is stopped and joined
///
/// # Example
///
/// ```ignore
/// let system = UsersSystem::start(config, role_reader, user_repository).await?;
/// let user_id = system
///     .command_bus
///     .dispatch(&system.context(), register_user)
///     .await?;
/// system.shutdown().await;
/// ```
pub struct UsersSystem {
    pub command_bus: CommandBus,
    pub query_bus: QueryBus,
    pub role_cache: RoleCacheService,
    config: AppConfig,
    root: Context,
}

impl UsersSystem {
    /// Loads the role cache, then binds every handler.
    ///
    /// Either step failing is fatal: whatever was started is stopped and the
    /// error is returned.
    pub async fn start(
        config: AppConfig,
        role_reader: Arc<dyn RoleReader>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Result<Self, StartupError> {
        info!(service = %config.service_name, "Starting users service");
        let root = Context::new();

        let role_cache = RoleCacheService::new(role_reader, config.role_cache_refresh);
        role_cache.init_and_start_refresh(&root).await?;

        let command_bus = CommandBus::new();
        let query_bus = QueryBus::new();
        if let Err(e) = register_handlers(&command_bus, &query_bus, &role_cache, user_repository) {
            error!(error = %e, "Handler registration failed");
            root.cancel();
            role_cache.stop().await;
            return Err(e.into());
        }

        info!(commands = ?command_bus.registered(), "Command handlers bound");
        info!(queries = ?query_bus.registered(), "Query handlers bound");

        Ok(Self {
            command_bus,
            query_bus,
            role_cache,
            config,
            root,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// A per-request context; cancelled when the system shuts down.
    pub fn context(&self) -> Context {
        self.root.child()
    }

    /// Cancels in-flight work and waits for the role cache refresh task.
    pub async fn shutdown(self) {
        info!("Shutting down users service...");
        self.root.cancel();
        self.role_cache.stop().await;
        info!("Users service shutdown complete.");
    }
}

fn register_handlers(
    command_bus: &CommandBus,
    query_bus: &QueryBus,
    role_cache: &RoleCacheService,
    users: Arc<dyn UserRepository>,
) -> Result<(), MediatorError> {
    command_bus.register_handler::<RegisterUser, _>(RegisterUserHandler::new(
        Arc::clone(&users),
        role_cache.clone(),
    ))?;
    command_bus
        .register_handler::<UpdateUserProfile, _>(UpdateUserProfileHandler::new(Arc::clone(&users)))?;
    query_bus.register_handler::<GetUserProfile, _>(GetUserProfileHandler::new(users))?;
    Ok(())
}
