//! In-process cache of the role set, refreshed in the background.

pub mod error;
pub mod reader;
pub mod service;

pub use error::CacheError;
pub use reader::{default_roles, InMemoryRoleReader, ReaderError, RoleReader};
pub use service::{
    CacheStats, RoleCacheService, RoleSnapshot, DEFAULT_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL,
};
