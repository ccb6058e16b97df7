//! Error types for the role cache.

use crate::model::RoleName;
use thiserror::Error;

/// Errors returned by [`RoleCacheService`](super::RoleCacheService).
///
/// `Clone` so that every concurrent caller of the one-time initial load can
/// receive the same outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// No load has completed successfully yet.
    #[error("role cache not initialized")]
    NotInitialized,

    /// The current snapshot has no role with this name.
    #[error("role not found: {0}")]
    RoleNameNotFound(RoleName),

    /// The current snapshot has no role with this id.
    #[error("role not found: id {0}")]
    RoleIdNotFound(u32),

    /// The role source failed to return the role set.
    #[error("failed to fetch all roles from source: {0}")]
    SourceUnavailable(String),
}

impl CacheError {
    /// True for "definitely absent", as opposed to "not ready" or "source down".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CacheError::RoleNameNotFound(_) | CacheError::RoleIdNotFound(_)
        )
    }
}
