//! Error types for the users application.

use crate::model::RoleAlreadyAssigned;
use crate::model::{RoleName, UserId};
use crate::role_cache::CacheError;
use mediator::MediatorError;
use std::fmt;
use thiserror::Error;

/// Errors returned by user commands, queries and the repository.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    /// The requested user was not found.
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// A user is already registered for this LINE account.
    #[error("User already exists for LINE user id: {0}")]
    LineUserAlreadyExists(String),

    /// An insert hit an id that is already stored.
    #[error("User id already in use: {0}")]
    IdTaken(UserId),

    #[error("Role {0} already assigned to user")]
    RoleAlreadyAssigned(RoleName),

    /// The request data is invalid.
    #[error("User validation error: {0}")]
    Validation(String),

    /// The backing store failed.
    #[error("User repository error: {0}")]
    Repository(String),

    #[error("Role lookup failed: {0}")]
    Role(#[from] CacheError),

    /// Routing failure on the bus.
    #[error(transparent)]
    Mediator(#[from] MediatorError),
}

impl From<RoleAlreadyAssigned> for UserError {
    fn from(err: RoleAlreadyAssigned) -> Self {
        UserError::RoleAlreadyAssigned(err.0)
    }
}

/// Coarse error classification handed to transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UserError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UserError::NotFound(_) => ErrorCode::NotFound,
            UserError::LineUserAlreadyExists(_) | UserError::RoleAlreadyAssigned(_) => {
                ErrorCode::AlreadyExists
            }
            UserError::Validation(_) => ErrorCode::InvalidArgument,
            // A missing role is a seeding problem, not something the caller can fix.
            UserError::IdTaken(_)
            | UserError::Role(_)
            | UserError::Repository(_)
            | UserError::Mediator(_) => {
                ErrorCode::Internal
            }
        }
    }
}
