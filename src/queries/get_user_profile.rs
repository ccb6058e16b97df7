use crate::error::UserError;
use crate::model::{User, UserId, UserStatus};
use crate::repository::UserRepository;
use async_trait::async_trait;
use mediator::{Context, Handler, Query, Request};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Looks up one user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserProfile {
    pub user_id: UserId,
}

impl Request for GetUserProfile {
    type Output = UserProfileDto;
    type Error = UserError;
}
impl Query for GetUserProfile {}

/// Read model returned by [`GetUserProfile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    pub user_id: String,
    pub line_user_id: String,
    pub email: Option<String>,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: UserStatus,
    pub is_verified: bool,
    pub roles: Vec<String>,
}

impl From<User> for UserProfileDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id.0,
            line_user_id: user.line_user_id,
            email: user.email,
            display_name: user.profile.display_name,
            first_name: user.profile.first_name,
            last_name: user.profile.last_name,
            bio: user.profile.bio,
            avatar_url: user.profile.avatar_url,
            phone_number: user.profile.phone_number,
            address: user.profile.address,
            is_verified: user.status == UserStatus::Active,
            status: user.status,
            roles: user
                .roles
                .iter()
                .map(|role| role.name.as_str().to_string())
                .collect(),
        }
    }
}

pub struct GetUserProfileHandler {
    users: Arc<dyn UserRepository>,
}

impl GetUserProfileHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler<GetUserProfile> for GetUserProfileHandler {
    async fn handle(&self, _ctx: &Context, query: GetUserProfile) -> Result<UserProfileDto, UserError> {
        match self.users.find_by_id(&query.user_id).await? {
            Some(user) => {
                info!(user_id = %query.user_id, "User profile retrieved");
                Ok(user.into())
            }
            None => {
                warn!(user_id = %query.user_id, "User not found");
                Err(UserError::NotFound(query.user_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, RoleName};
    use crate::repository::InMemoryUserRepository;

    #[tokio::test]
    async fn returns_profile_with_role_names() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let mut user = User::new(UserId::from("user_1"), "line-a", None, "Alice");
        user.add_role(Role::new(1, RoleName::Poster)).unwrap();
        repo.insert(user).await.unwrap();
        let handler = GetUserProfileHandler::new(repo);

        let dto = handler
            .handle(&Context::new(), GetUserProfile { user_id: UserId::from("user_1") })
            .await
            .unwrap();

        assert_eq!(dto.display_name, "Alice");
        assert_eq!(dto.roles, vec!["POSTER".to_string()]);
        assert!(!dto.is_verified);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let handler = GetUserProfileHandler::new(Arc::new(InMemoryUserRepository::new()));
        let err = handler
            .handle(&Context::new(), GetUserProfile { user_id: UserId::from("user_9") })
            .await
            .unwrap_err();
        assert_eq!(err, UserError::NotFound(UserId::from("user_9")));
    }

    #[test]
    fn dto_serializes_camel_case_and_skips_empty_fields() {
        let user = User::new(UserId::from("user_1"), "line-a", None, "Alice");
        let json = serde_json::to_value(UserProfileDto::from(user)).unwrap();

        assert_eq!(json["userId"], "user_1");
        assert_eq!(json["lineUserId"], "line-a");
        assert_eq!(json["status"], "PENDING_VERIFICATION");
        assert!(json["email"].is_null());
        assert!(json.get("bio").is_none());
    }
}
