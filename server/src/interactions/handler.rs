//! Interaction Handlers
//!
//! Anything implementing [`InteractionHandler`] can be registered on a
//! [`Connection`](crate::Connection). Async closures taking a
//! [`ConnectionContext`] implement it automatically:
//!
//! ```ignore
//! connection.add_interaction_handler(|ctx: ConnectionContext| async move {
//!     if ctx.interaction().command_name() == Some("ping") {
//!         ctx.reply(InteractionCallbackData::content("pong"))?;
//!     }
//!     Ok(())
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::context::ConnectionContext;

/// Outcome of a handler. Errors are logged; they never stop later handlers.
pub type HandlerResult = anyhow::Result<()>;

/// Callback invoked for every non-ping interaction.
pub trait InteractionHandler: Send + Sync + 'static {
    fn handle(&self, ctx: ConnectionContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> InteractionHandler for F
where
    F: Fn(ConnectionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, ctx: ConnectionContext) -> BoxFuture<'static, HandlerResult> {
        self(ctx).boxed()
    }
}

/// Registered handler.
pub type SharedHandler = Arc<dyn InteractionHandler>;
