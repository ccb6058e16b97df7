use crate::error::UserError;
use crate::model::{RoleName, User, UserId};
use crate::repository::UserRepository;
use crate::role_cache::RoleCacheService;
use async_trait::async_trait;
use mediator::{Command, Context, Handler, Request};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Role every new user starts with.
pub const DEFAULT_ROLE: RoleName = RoleName::Poster;

/// Registers a user for a LINE account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUser {
    pub line_user_id: String,
    pub email: Option<String>,
    pub display_name: String,
}

impl Request for RegisterUser {
    type Output = UserId;
    type Error = UserError;
}
impl Command for RegisterUser {}

impl RegisterUser {
    fn validate(&self) -> Result<(), UserError> {
        if self.line_user_id.trim().is_empty() {
            return Err(UserError::Validation("line user id is required".into()));
        }
        if self.display_name.trim().is_empty() {
            return Err(UserError::Validation("display name is required".into()));
        }
        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !valid {
                return Err(UserError::Validation(format!("invalid email: {email}")));
            }
        }
        Ok(())
    }
}

pub struct RegisterUserHandler {
    users: Arc<dyn UserRepository>,
    roles: RoleCacheService,
}

impl RegisterUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, roles: RoleCacheService) -> Self {
        Self { users, roles }
    }
}

#[async_trait]
impl Handler<RegisterUser> for RegisterUserHandler {
    async fn handle(&self, _ctx: &Context, cmd: RegisterUser) -> Result<UserId, UserError> {
        cmd.validate()?;

        if self.users.exists_by_line_user_id(&cmd.line_user_id).await? {
            warn!(line_user_id = %cmd.line_user_id, "User already exists");
            return Err(UserError::LineUserAlreadyExists(cmd.line_user_id));
        }

        let id = self.users.next_id().await?;
        let mut user = User::new(id, cmd.line_user_id, cmd.email, cmd.display_name);

        let role = self.roles.get_role_by_name(DEFAULT_ROLE).map_err(|e| {
            error!(role = %DEFAULT_ROLE, error = %e, "Failed to get default role");
            e
        })?;
        user.add_role(role)?;

        let user_id = user.id.clone();
        self.users.insert(user).await?;

        info!(%user_id, "User registered");
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, UserStatus};
    use crate::repository::InMemoryUserRepository;
    use crate::role_cache::{CacheError, InMemoryRoleReader};
    use std::time::Duration;

    async fn warm_cache(roles: Vec<Role>) -> RoleCacheService {
        let cache = RoleCacheService::new(
            Arc::new(InMemoryRoleReader::new(roles)),
            Duration::from_secs(3600),
        );
        cache.init_and_start_refresh(&Context::new()).await.unwrap();
        cache
    }

    fn register(line_user_id: &str) -> RegisterUser {
        RegisterUser {
            line_user_id: line_user_id.into(),
            email: Some("a@example.com".into()),
            display_name: "Alice".into(),
        }
    }

    #[tokio::test]
    async fn registers_pending_user_with_default_role() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let cache = warm_cache(vec![Role::new(1, RoleName::Poster)]).await;
        let handler = RegisterUserHandler::new(repo.clone(), cache.clone());

        let id = handler.handle(&Context::new(), register("line-a")).await.unwrap();

        assert_eq!(id, UserId::from("user_1"));
        let user = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(user.status, UserStatus::PendingVerification);
        assert!(user.has_role(RoleName::Poster));
        cache.stop().await;
    }

    #[tokio::test]
    async fn keeps_existing_users_when_ids_are_already_stored() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let existing = User::new(UserId::from("user_1"), "line-existing", None, "Bob");
        repo.insert(existing.clone()).await.unwrap();
        let cache = warm_cache(vec![Role::new(1, RoleName::Poster)]).await;
        let handler = RegisterUserHandler::new(repo.clone(), cache.clone());

        let id = handler.handle(&Context::new(), register("line-new")).await.unwrap();

        assert_ne!(id, existing.id);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.find_by_id(&existing.id).await.unwrap(), Some(existing));
        assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().line_user_id, "line-new");
        cache.stop().await;
    }

    #[tokio::test]
    async fn rejects_taken_line_user_id() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let cache = warm_cache(vec![Role::new(1, RoleName::Poster)]).await;
        let handler = RegisterUserHandler::new(repo.clone(), cache.clone());
        let ctx = Context::new();

        handler.handle(&ctx, register("line-a")).await.unwrap();
        assert_eq!(
            handler.handle(&ctx, register("line-a")).await,
            Err(UserError::LineUserAlreadyExists("line-a".into()))
        );
        assert_eq!(repo.len(), 1);
        cache.stop().await;
    }

    #[tokio::test]
    async fn fails_when_default_role_is_missing() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let cache = warm_cache(vec![Role::new(3, RoleName::Admin)]).await;
        let handler = RegisterUserHandler::new(repo.clone(), cache.clone());

        assert_eq!(
            handler.handle(&Context::new(), register("line-a")).await,
            Err(UserError::Role(CacheError::RoleNameNotFound(RoleName::Poster)))
        );
        assert!(repo.is_empty());
        cache.stop().await;
    }

    #[tokio::test]
    async fn fails_when_role_cache_is_cold() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let cache = RoleCacheService::with_default_interval(Arc::new(
            InMemoryRoleReader::with_default_roles(),
        ));
        let handler = RegisterUserHandler::new(repo.clone(), cache);

        let err = handler
            .handle(&Context::new(), register("line-a"))
            .await
            .unwrap_err();
        assert_eq!(err, UserError::Role(CacheError::NotInitialized));
    }

    #[test]
    fn validation_rules() {
        let mut cmd = register("line-a");
        assert!(cmd.validate().is_ok());

        cmd.email = Some("not-an-email".into());
        assert!(matches!(cmd.validate(), Err(UserError::Validation(_))));

        cmd.email = None;
        cmd.display_name = "  ".into();
        assert!(matches!(cmd.validate(), Err(UserError::Validation(_))));

        let blank_line = RegisterUser {
            line_user_id: String::new(),
            ..register("x")
        };
        assert!(matches!(blank_line.validate(), Err(UserError::Validation(_))));
    }
}
