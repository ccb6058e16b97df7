//! Write-side requests and their handlers, routed through the command bus.

pub mod register_user;
pub mod update_user_profile;

pub use register_user::{RegisterUser, RegisterUserHandler, DEFAULT_ROLE};
pub use update_user_profile::{UpdateUserProfile, UpdateUserProfileHandler};
