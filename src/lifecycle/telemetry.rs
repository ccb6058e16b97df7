//! # Logging
//!
//! [`setup_tracing`] installs the global `tracing` subscriber. Verbosity is
//! controlled by `RUST_LOG`:
//!
//! ```bash
//! # Startup, registrations, cache loads
//! RUST_LOG=info cargo run
//!
//! # Adds one span per dispatch with bus, request and correlation id
//! RUST_LOG=debug cargo run
//!
//! # Only the role cache
//! RUST_LOG=exchange_users::role_cache=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a demo run looks like:
//!
//! ```text
//! INFO Loading roles into cache
//! INFO Initial roles loaded into cache count=3
//! INFO Handler registered bus=command request="RegisterUser" handler="RegisterUserHandler"
//! INFO user_registration: User registered user_id=user_1
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
