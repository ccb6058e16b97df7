//! Read-side requests and their handlers, routed through the query bus.

pub mod get_user_profile;

pub use get_user_profile::{GetUserProfile, GetUserProfileHandler, UserProfileDto};
