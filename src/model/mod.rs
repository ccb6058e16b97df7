//! Domain types shared by the handlers, the role cache and the repositories.

pub mod role;
pub mod user;

pub use role::*;
pub use user::*;
