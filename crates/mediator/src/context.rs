//! # Request Context
//!
//! Every dispatch carries a [`Context`]: an optional correlation id that ends up
//! in tracing fields, and a cancellation token that handlers and background
//! tasks can observe. The mediator never cancels anything itself.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cancellation and correlation data passed to every handler.
///
/// Cloning is cheap; clones share the same token.
#[derive(Debug, Clone, Default)]
pub struct Context {
    correlation_id: Option<Arc<str>>,
    token: CancellationToken,
}

impl Context {
    /// A fresh root context with its own cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context tagged with `id`.
    pub fn with_correlation_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Derives a context that is cancelled when this one is, but can also be
    /// cancelled on its own without affecting the parent.
    pub fn child(&self) -> Self {
        Self {
            correlation_id: self.correlation_id.clone(),
            token: self.token.child_token(),
        }
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The underlying token, for `tokio::select!` loops that outlive a borrow.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
