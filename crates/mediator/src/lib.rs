//! # Mediator
//!
//! This crate provides an in-process **command/query mediator**: a typed
//! dispatch registry that routes each request value to exactly one
//! registered handler, keyed by the request's *type*.
//!
//! ## Why two buses?
//!
//! Commands (write intent) and queries (read intent) go through separate
//! [`CommandBus`] and [`QueryBus`] instances. They share one implementation
//! ([`bus::Mediator`]) but never a registry, so read and write routing can be
//! wired, traced and scaled independently.
//!
//! ## Architecture Overview
//!
//! 1. **Request Layer** ([`Request`], [`Command`], [`Query`], [`Handler`]) - the
//!    contract between a request type and its handler, checked by the compiler
//! 2. **Binding Layer** - each registration wraps its handler in an adapter with
//!    one erased call signature, so many request types fit in one registry
//! 3. **Registry Layer** ([`HandlerRegistry`]) - insert-if-absent storage behind
//!    a single mutex
//!
//! ## Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use mediator::{Context, Handler, MediatorError, Query, QueryBus, Request};
//!
//! #[derive(Debug)]
//! struct GetGreeting { name: String }
//!
//! #[derive(Debug, thiserror::Error)]
//! enum GreetingError {
//!     #[error(transparent)]
//!     Mediator(#[from] MediatorError),
//! }
//!
//! impl Request for GetGreeting {
//!     type Output = String;
//!     type Error = GreetingError;
//! }
//! impl Query for GetGreeting {}
//!
//! struct GreetingHandler;
//!
//! #[async_trait]
//! impl Handler<GetGreeting> for GreetingHandler {
//!     async fn handle(&self, _ctx: &Context, q: GetGreeting) -> Result<String, GreetingError> {
//!         Ok(format!("hello {}", q.name))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // One bus per application root, threaded through construction.
//!     let queries = QueryBus::new();
//!     queries.register_handler::<GetGreeting, _>(GreetingHandler).unwrap();
//!
//!     // A second registration for the same type is an error, not an overwrite.
//!     assert!(matches!(
//!         queries.register_handler::<GetGreeting, _>(GreetingHandler),
//!         Err(MediatorError::AlreadyRegistered { .. })
//!     ));
//!
//!     let greeting = queries
//!         .dispatch(&Context::new(), GetGreeting { name: "ada".into() })
//!         .await
//!         .unwrap();
//!     assert_eq!(greeting, "hello ada");
//! }
//! ```
//!
//! ## Error handling
//!
//! Handler errors come back exactly as the handler produced them. Routing
//! failures ([`MediatorError::HandlerNotFound`],
//! [`MediatorError::InvalidHandlerState`]) reach the caller through the
//! request's own error type via `From<MediatorError>`. Registration errors
//! are returned from `register_handler` and are meant to abort startup.
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockHandler`](mock::MockHandler), a
//! scriptable handler for testing code that dispatches through a bus.

mod binding;
pub mod bus;
pub mod command;
pub mod context;
pub mod error;
pub mod mock;
pub mod query;
pub mod registry;
pub mod request;

// Re-export core types for convenience
pub use bus::Mediator;
pub use command::CommandBus;
pub use context::Context;
pub use error::{BusKind, MediatorError};
pub use query::QueryBus;
pub use registry::HandlerRegistry;
pub use request::{Command, Handler, Query, Request, RequestKey};
