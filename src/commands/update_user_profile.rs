use crate::error::UserError;
use crate::model::{ProfileUpdate, UserId};
use crate::repository::UserRepository;
use async_trait::async_trait;
use mediator::{Command, Context, Handler, Request};
use std::sync::Arc;
use tracing::{info, warn};

/// Replaces a user's profile details.
///
/// `display_name` is kept when `None`; every other field is overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserProfile {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl Request for UpdateUserProfile {
    type Output = UserId;
    type Error = UserError;
}
impl Command for UpdateUserProfile {}

impl UpdateUserProfile {
    fn into_parts(self) -> (UserId, ProfileUpdate) {
        let update = ProfileUpdate {
            display_name: self.display_name,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            avatar_url: self.avatar_url,
            phone_number: self.phone_number,
            address: self.address,
        };
        (self.user_id, update)
    }
}

pub struct UpdateUserProfileHandler {
    users: Arc<dyn UserRepository>,
}

impl UpdateUserProfileHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler<UpdateUserProfile> for UpdateUserProfileHandler {
    async fn handle(&self, _ctx: &Context, cmd: UpdateUserProfile) -> Result<UserId, UserError> {
        let (user_id, update) = cmd.into_parts();
        if matches!(&update.display_name, Some(name) if name.trim().is_empty()) {
            return Err(UserError::Validation("display name must not be blank".into()));
        }

        let Some(mut user) = self.users.find_by_id(&user_id).await? else {
            warn!(%user_id, "User not found");
            return Err(UserError::NotFound(user_id));
        };

        user.update_profile(update);
        self.users.save(user).await?;

        info!(%user_id, "User profile updated");
        Ok(user_id)
    }
}
