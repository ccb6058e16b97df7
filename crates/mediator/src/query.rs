//! # Query Bus
//!
//! Routes read-intent requests. Kept apart from the [`CommandBus`](crate::CommandBus)
//! so reads and writes can be wired, traced and scaled independently.

use crate::bus::Mediator;
use crate::context::Context;
use crate::error::{BusKind, MediatorError};
use crate::request::{Handler, Query};

/// Mediator for [`Query`] requests.
#[derive(Debug, Clone)]
pub struct QueryBus {
    inner: Mediator,
}

impl Default for QueryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBus {
    pub fn new() -> Self {
        Self {
            inner: Mediator::new(BusKind::Query),
        }
    }

    /// Binds `handler` to query type `Q`. See [`Mediator::register_handler`].
    pub fn register_handler<Q, H>(&self, handler: H) -> Result<(), MediatorError>
    where
        Q: Query,
        H: Handler<Q>,
    {
        self.inner.register_handler::<Q, H>(handler)
    }

    pub async fn dispatch<Q: Query>(&self, ctx: &Context, query: Q) -> Result<Q::Output, Q::Error> {
        self.inner.dispatch(ctx, query).await
    }

    pub fn is_registered<Q: Query>(&self) -> bool {
        self.inner.is_registered::<Q>()
    }

    pub fn registered(&self) -> Vec<&'static str> {
        self.inner.registered()
    }
}
