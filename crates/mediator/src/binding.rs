//! # Handler Bindings
//!
//! The registry holds handlers for many unrelated request types, so each
//! registration wraps its concretely typed handler in a [`HandlerAdapter`]
//! that exposes one erased call signature:
//!
//! ```text
//! (&Context, Box<dyn Any>) -> Box<dyn Any>   // boxed Result<R::Output, R::Error>
//! ```
//!
//! The adapter is the only place that knows `R`; the mediator recovers the
//! typed result by downcasting on the way out.

use crate::context::Context;
use crate::request::{Handler, Request, RequestKey};
use async_trait::async_trait;
use std::any::Any;
use std::marker::PhantomData;

pub(crate) type ErasedRequest = Box<dyn Any + Send>;
pub(crate) type ErasedResult = Box<dyn Any + Send>;

/// Type-erased view of a registered handler.
#[async_trait]
pub(crate) trait ErasedHandler: Send + Sync {
    /// The request type this binding was built for.
    fn request_key(&self) -> RequestKey;

    fn handler_name(&self) -> &'static str;

    /// Runs the handler. Hands the request back untouched when it is not the
    /// type this binding accepts.
    async fn call(&self, ctx: &Context, request: ErasedRequest)
        -> Result<ErasedResult, ErasedRequest>;
}

/// Closes over a `Handler<R>` and implements [`ErasedHandler`] for it.
pub(crate) struct HandlerAdapter<R, H> {
    handler: H,
    // fn(R) keeps the adapter Send + Sync regardless of R.
    _request: PhantomData<fn(R)>,
}

impl<R, H> HandlerAdapter<R, H>
where
    R: Request,
    H: Handler<R>,
{
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _request: PhantomData,
        }
    }
}

#[async_trait]
impl<R, H> ErasedHandler for HandlerAdapter<R, H>
where
    R: Request,
    H: Handler<R>,
{
    fn request_key(&self) -> RequestKey {
        RequestKey::of::<R>()
    }

    fn handler_name(&self) -> &'static str {
        std::any::type_name::<H>()
    }

    async fn call(
        &self,
        ctx: &Context,
        request: ErasedRequest,
    ) -> Result<ErasedResult, ErasedRequest> {
        let request = request.downcast::<R>()?;
        let result: Result<R::Output, R::Error> = self.handler.handle(ctx, *request).await;
        Ok(Box::new(result))
    }
}
