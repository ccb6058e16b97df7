//! # Mediator Errors
//!
//! Every failure the mediator itself can produce. Handler errors never pass
//! through this type: they are returned to the caller exactly as the handler
//! produced them. Request error types embed `MediatorError` through a `From`
//! conversion so that routing failures and handler failures share one
//! `Result` at the call site.

use std::fmt;

/// Which mediator produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusKind {
    Command,
    Query,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::Command => f.write_str("command"),
            BusKind::Query => f.write_str("query"),
        }
    }
}

/// Errors that can occur while registering or dispatching requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediatorError {
    /// A handler is already bound to this request type. The existing binding is kept.
    #[error("{kind} handler already registered for {kind} type: {request}")]
    AlreadyRegistered { kind: BusKind, request: &'static str },

    /// The binding produced at registration did not match the routing key.
    #[error("invalid {kind} handler type {handler} for {kind} type {request}: {reason}")]
    InvalidHandlerShape {
        kind: BusKind,
        request: &'static str,
        handler: &'static str,
        reason: String,
    },

    /// No handler is bound to this request type.
    #[error("no {kind} handler found for {kind} type: {request}")]
    HandlerNotFound { kind: BusKind, request: &'static str },

    /// A bound handler rejected the request or produced an output of the wrong type.
    #[error("{kind} handler {handler} is in an invalid state for {kind} type {request}")]
    InvalidHandlerState {
        kind: BusKind,
        request: &'static str,
        handler: &'static str,
    },
}

impl MediatorError {
    /// The bus that raised this error.
    pub fn bus(&self) -> BusKind {
        match self {
            MediatorError::AlreadyRegistered { kind, .. }
            | MediatorError::InvalidHandlerShape { kind, .. }
            | MediatorError::HandlerNotFound { kind, .. }
            | MediatorError::InvalidHandlerState { kind, .. } => *kind,
        }
    }

    /// Fully qualified name of the request type involved.
    pub fn request(&self) -> &'static str {
        match self {
            MediatorError::AlreadyRegistered { request, .. }
            | MediatorError::InvalidHandlerShape { request, .. }
            | MediatorError::HandlerNotFound { request, .. }
            | MediatorError::InvalidHandlerState { request, .. } => request,
        }
    }
}
