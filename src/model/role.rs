use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of role names known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Poster,
    Tasker,
    Admin,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Poster => "POSTER",
            RoleName::Tasker => "TASKER",
            RoleName::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role name: {0}")]
pub struct UnknownRoleName(pub String);

impl FromStr for RoleName {
    type Err = UnknownRoleName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSTER" => Ok(RoleName::Poster),
            "TASKER" => Ok(RoleName::Tasker),
            "ADMIN" => Ok(RoleName::Admin),
            other => Err(UnknownRoleName(other.to_string())),
        }
    }
}

/// A role as stored by the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: u32,
    pub name: RoleName,
    pub description: Option<String>,
}

impl Role {
    pub fn new(id: u32, name: RoleName) -> Self {
        Self {
            id,
            name,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
