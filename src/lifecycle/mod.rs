//! Startup, wiring and shutdown of the users service.

pub mod telemetry;
pub mod users_system;

pub use telemetry::setup_tracing;
pub use users_system::{StartupError, UsersSystem};
