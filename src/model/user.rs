use crate::model::role::{Role, RoleName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered user (e.g. `user_1`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
    PendingVerification,
    Suspended,
}

/// Profile details owned by a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Field changes applied by [`User::update_profile`].
///
/// `display_name` is only replaced when present; every other field is
/// overwritten, so `None` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Returned by [`User::add_role`] when the role is already held.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role {0} already assigned to user")]
pub struct RoleAlreadyAssigned(pub RoleName);

/// The user aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub line_user_id: String,
    pub email: Option<String>,
    pub status: UserStatus,
    pub profile: Profile,
    pub roles: Vec<Role>,
}

impl User {
    /// A freshly registered user, pending verification and without roles.
    pub fn new(
        id: UserId,
        line_user_id: impl Into<String>,
        email: Option<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            line_user_id: line_user_id.into(),
            email,
            status: UserStatus::PendingVerification,
            profile: Profile {
                display_name: display_name.into(),
                ..Profile::default()
            },
            roles: Vec::new(),
        }
    }

    pub fn has_role(&self, name: RoleName) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }

    pub fn add_role(&mut self, role: Role) -> Result<(), RoleAlreadyAssigned> {
        if self.has_role(role.name) {
            return Err(RoleAlreadyAssigned(role.name));
        }
        self.roles.push(role);
        Ok(())
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        if let Some(display_name) = update.display_name {
            self.profile.display_name = display_name;
        }
        self.profile.first_name = update.first_name;
        self.profile.last_name = update.last_name;
        self.profile.bio = update.bio;
        self.profile.avatar_url = update.avatar_url;
        self.profile.phone_number = update.phone_number;
        self.profile.address = update.address;
    }
}
