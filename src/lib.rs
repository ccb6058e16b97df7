//! # Exchange Users
//!
//! The users service core: user registration and profile management routed
//! through a command/query mediator, backed by an in-process cache of the
//! role set.
//!
//! ## Module Tour
//!
//! ### 1. Routing ([`mediator`] crate)
//! Commands go through a [`CommandBus`](mediator::CommandBus), queries through a
//! [`QueryBus`](mediator::QueryBus). Each request type is bound to exactly one
//! handler at startup.
//!
//! ### 2. Role cache ([`role_cache`])
//! [`RoleCacheService`](role_cache::RoleCacheService) loads every role once at
//! startup, answers lookups from memory and reloads on a fixed interval.
//! A failed reload keeps the previous roles.
//!
//! ### 3. Requests ([`commands`], [`queries`])
//! - [`RegisterUser`](commands::RegisterUser): new user with the default `POSTER` role
//! - [`UpdateUserProfile`](commands::UpdateUserProfile)
//! - [`GetUserProfile`](queries::GetUserProfile)
//!
//! ### 4. Lifecycle ([`lifecycle`])
//! [`UsersSystem`](lifecycle::UsersSystem) orders startup (cache first, then
//! handler registration) and shuts the background refresh down.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod queries;
pub mod repository;
pub mod role_cache;

pub use error::{ErrorCode, UserError};
