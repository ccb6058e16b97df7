//! # Mediator Core
//!
//! The registration and dispatch logic shared by [`CommandBus`](crate::CommandBus)
//! and [`QueryBus`](crate::QueryBus). Each bus owns its own [`Mediator`], so
//! command and query routing never share a namespace.
//!
//! ## Binding lifecycle
//!
//! ```text
//! unbound -> registering -> bound      (terminal)
//!                        \-> rejected  (registry entry deleted)
//! ```
//!
//! There is no way to replace or remove a bound handler.

use crate::binding::{ErasedHandler, HandlerAdapter};
use crate::context::Context;
use crate::error::{BusKind, MediatorError};
use crate::registry::HandlerRegistry;
use crate::request::{Handler, Request, RequestKey};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

type Binding = Arc<dyn ErasedHandler>;

/// Typed registration and dispatch over a [`HandlerRegistry`].
///
/// Cloning is cheap and clones share the same registry.
#[derive(Clone)]
pub struct Mediator {
    kind: BusKind,
    registry: Arc<HandlerRegistry<Binding>>,
}

impl Mediator {
    pub fn new(kind: BusKind) -> Self {
        Self {
            kind,
            registry: Arc::new(HandlerRegistry::new()),
        }
    }

    pub fn kind(&self) -> BusKind {
        self.kind
    }

    /// Binds `handler` to request type `R`.
    ///
    /// Fails with [`MediatorError::AlreadyRegistered`] if `R` is already bound
    /// (the existing handler stays active), or with
    /// [`MediatorError::InvalidHandlerShape`] if the stored binding does not
    /// route `R`, in which case no trace of the attempt is left behind.
    pub fn register_handler<R, H>(&self, handler: H) -> Result<(), MediatorError>
    where
        R: Request,
        H: Handler<R>,
    {
        let binding: Binding = Arc::new(HandlerAdapter::<R, H>::new(handler));
        self.bind(RequestKey::of::<R>(), binding)
    }

    /// Stores `binding` under `key`, then checks that it routes `key`.
    fn bind(&self, key: RequestKey, binding: Binding) -> Result<(), MediatorError> {
        let handler_name = binding.handler_name();

        if self.registry.store(key, Arc::clone(&binding)) {
            warn!(bus = %self.kind, request = key.short_name(), "Duplicate registration rejected");
            return Err(MediatorError::AlreadyRegistered {
                kind: self.kind,
                request: key.name(),
            });
        }

        if let Err(reason) = validate_binding(&key, binding.as_ref()) {
            self.registry.delete(&key);
            warn!(bus = %self.kind, request = key.short_name(), %reason, "Handler rejected");
            return Err(MediatorError::InvalidHandlerShape {
                kind: self.kind,
                request: key.name(),
                handler: handler_name,
                reason,
            });
        }

        info!(
            bus = %self.kind,
            request = key.short_name(),
            handler = crate::request::short_type_name(handler_name),
            "Handler registered"
        );
        Ok(())
    }

    /// Routes `request` to its bound handler and returns the handler's result unchanged.
    pub async fn dispatch<R: Request>(&self, ctx: &Context, request: R) -> Result<R::Output, R::Error> {
        let key = RequestKey::of::<R>();
        let span = tracing::debug_span!(
            "dispatch",
            bus = %self.kind,
            request = key.short_name(),
            correlation_id = ctx.correlation_id().unwrap_or_default(),
        );
        self.route(ctx, key, request).instrument(span).await
    }

    async fn route<R: Request>(
        &self,
        ctx: &Context,
        key: RequestKey,
        request: R,
    ) -> Result<R::Output, R::Error> {
        let Some(binding) = self.registry.load(&key) else {
            warn!("No handler bound");
            return Err(MediatorError::HandlerNotFound {
                kind: self.kind,
                request: key.name(),
            }
            .into());
        };

        debug!(?request, "Dispatching");
        let invalid_state = || MediatorError::InvalidHandlerState {
            kind: self.kind,
            request: key.name(),
            handler: binding.handler_name(),
        };

        let erased = match binding.call(ctx, Box::new(request)).await {
            Ok(erased) => erased,
            Err(_) => {
                warn!(handler = binding.handler_name(), "Binding refused request");
                return Err(invalid_state().into());
            }
        };

        match erased.downcast::<Result<R::Output, R::Error>>() {
            Ok(result) => {
                debug!(ok = result.is_ok(), "Handled");
                *result
            }
            Err(_) => {
                warn!(handler = binding.handler_name(), "Binding returned foreign output");
                Err(invalid_state().into())
            }
        }
    }

    pub fn is_registered<R: Request>(&self) -> bool {
        self.registry.contains(&RequestKey::of::<R>())
    }

    /// Names of all bound request types, sorted.
    pub fn registered(&self) -> Vec<&'static str> {
        self.registry.keys().iter().map(RequestKey::name).collect()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("kind", &self.kind)
            .field("registered", &self.registered())
            .finish()
    }
}

/// Checks that a freshly stored binding actually routes the key it was stored under.
fn validate_binding(key: &RequestKey, binding: &dyn ErasedHandler) -> Result<(), String> {
    let accepted = binding.request_key();
    if accepted != *key {
        return Err(format!(
            "handle accepts {}, expected {}",
            accepted.name(),
            key.name()
        ));
    }
    Ok(())
}
