//! # Command Bus
//!
//! Routes write-intent requests. Only types implementing [`Command`] can be
//! registered or dispatched here.

use crate::bus::Mediator;
use crate::context::Context;
use crate::error::{BusKind, MediatorError};
use crate::request::{Command, Handler};

/// Mediator for [`Command`] requests.
///
/// ```rust
/// use async_trait::async_trait;
/// use mediator::{Command, CommandBus, Context, Handler, MediatorError, Request};
///
/// #[derive(Debug)]
/// struct Rename { name: String }
///
/// #[derive(Debug, thiserror::Error)]
/// enum RenameError {
///     #[error("empty name")]
///     Empty,
///     #[error(transparent)]
///     Mediator(#[from] MediatorError),
/// }
///
/// impl Request for Rename { type Output = (); type Error = RenameError; }
/// impl Command for Rename {}
///
/// struct RenameHandler;
///
/// #[async_trait]
/// impl Handler<Rename> for RenameHandler {
///     async fn handle(&self, _ctx: &Context, cmd: Rename) -> Result<(), RenameError> {
///         if cmd.name.is_empty() { return Err(RenameError::Empty); }
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let bus = CommandBus::new();
///     bus.register_handler::<Rename, _>(RenameHandler).unwrap();
///
///     let ctx = Context::new();
///     assert!(bus.dispatch(&ctx, Rename { name: "ok".into() }).await.is_ok());
///     assert!(matches!(
///         bus.dispatch(&ctx, Rename { name: String::new() }).await,
///         Err(RenameError::Empty)
///     ));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CommandBus {
    inner: Mediator,
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBus {
    pub fn new() -> Self {
        Self {
            inner: Mediator::new(BusKind::Command),
        }
    }

    /// Binds `handler` to command type `C`. See [`Mediator::register_handler`].
    pub fn register_handler<C, H>(&self, handler: H) -> Result<(), MediatorError>
    where
        C: Command,
        H: Handler<C>,
    {
        self.inner.register_handler::<C, H>(handler)
    }

    pub async fn dispatch<C: Command>(&self, ctx: &Context, command: C) -> Result<C::Output, C::Error> {
        self.inner.dispatch(ctx, command).await
    }

    pub fn is_registered<C: Command>(&self) -> bool {
        self.inner.is_registered::<C>()
    }

    pub fn registered(&self) -> Vec<&'static str> {
        self.inner.registered()
    }
}
