//! # Requests and Handlers
//!
//! A request is any value whose *type* is its routing key. It declares what a
//! successful handler returns (`Output`) and what error type the caller sees
//! (`Error`). A handler for `R` is any `Handler<R>`.
//!
//! # Shape checking
//!
//! The handler contract is a trait bound, so a handler with the wrong
//! parameter or return types never reaches the registry:
//!
//! ```compile_fail
//! use async_trait::async_trait;
//! use mediator::{Command, CommandBus, Context, Handler, MediatorError, Request};
//!
//! #[derive(Debug)] struct Ping;
//! #[derive(Debug)] struct Pong;
//! #[derive(Debug)] struct PingError(MediatorError);
//! impl From<MediatorError> for PingError { fn from(e: MediatorError) -> Self { PingError(e) } }
//!
//! impl Request for Ping { type Output = u32; type Error = PingError; }
//! impl Command for Ping {}
//!
//! struct PongHandler;
//!
//! // Handles `Pong`, not `Ping`.
//! #[async_trait]
//! impl Handler<Pong> for PongHandler {
//!     async fn handle(&self, _: &Context, _: Pong) -> Result<u32, PingError> { Ok(1) }
//! }
//!
//! let bus = CommandBus::new();
//! bus.register_handler::<Ping, _>(PongHandler).unwrap();
//! ```

use crate::context::Context;
use crate::error::MediatorError;
use async_trait::async_trait;
use std::any::TypeId;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

/// A value routed by the mediator to exactly one handler.
pub trait Request: Send + Debug + 'static {
    /// What the handler returns on success. Use `()` for requests without a value.
    type Output: Send + 'static;

    /// The error type seen by the caller. Handler errors pass through unchanged;
    /// routing failures are converted with `From<MediatorError>`.
    type Error: From<MediatorError> + Send + 'static;
}

/// Marker for write-intent requests, accepted by [`CommandBus`](crate::CommandBus).
pub trait Command: Request {}

/// Marker for read-intent requests, accepted by [`QueryBus`](crate::QueryBus).
pub trait Query: Request {}

/// Handles one request type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync + 'static {
    async fn handle(&self, ctx: &Context, request: R) -> Result<R::Output, R::Error>;
}

/// Routing key of a request type.
///
/// Equality and hashing use only the `TypeId`; the name is carried for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct RequestKey {
    id: TypeId,
    name: &'static str,
}

impl RequestKey {
    pub fn of<R: 'static>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: std::any::type_name::<R>(),
        }
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path (e.g. `RegisterUser`).
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for RequestKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strips the module path, keeping generic arguments intact.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
