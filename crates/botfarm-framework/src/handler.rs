//! Listener callbacks.
//!
//! Any async closure or function taking a [`Message`] is a [`Handler`]. Its
//! return value is processed by [`HandleResponse`]:
//!
//! ```rust,ignore
//! // Nothing to do afterwards
//! session.hear("hello", |msg: Message| async move {
//!     let _ = msg.reply("hi").await;
//! })?;
//!
//! // Errors are logged
//! session.hear("ping", |msg: Message| async move {
//!     msg.reply("PONG").await?;
//!     Ok::<_, TransportError>(())
//! })?;
//!
//! // A returned string is sent as the reply
//! session.command("echo (.+)", |msg: Message| async move {
//!     msg.matches()[1].to_owned()
//! })?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::error;

use botfarm_core::Message;

// ============================================================================
// HandleResponse
// ============================================================================

/// Handles the value a callback returned.
#[async_trait]
pub trait HandleResponse: Send {
    /// Consumes the value in the context of the message that triggered it.
    async fn into_response(self, msg: &Message);
}

#[async_trait]
impl HandleResponse for () {
    async fn into_response(self, _msg: &Message) {}
}

/// Replies with the string; a failed reply is logged.
#[async_trait]
impl HandleResponse for String {
    async fn into_response(self, msg: &Message) {
        if let Err(e) = msg.reply(&self).await {
            error!(backend = %msg.backend(), "Failed to send reply: {e}");
        }
    }
}

#[async_trait]
impl<T: HandleResponse> HandleResponse for Option<T> {
    async fn into_response(self, msg: &Message) {
        if let Some(t) = self {
            t.into_response(msg).await;
        }
    }
}

/// On `Err`, the error is logged.
#[async_trait]
impl<T: HandleResponse, E: std::fmt::Display + Send> HandleResponse for Result<T, E> {
    async fn into_response(self, msg: &Message) {
        match self {
            Ok(t) => t.into_response(msg).await,
            Err(e) => {
                error!(backend = %msg.backend(), "Handler error: {e}");
            }
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// A listener callback.
///
/// Implemented for every `FnOnce(Message) -> impl Future` that is `Clone`
/// and whose output implements [`HandleResponse`].
#[async_trait]
pub trait Handler: Clone + Send + Sync + 'static {
    /// Runs the callback for one matched message.
    async fn call(self, msg: Message);
}

#[async_trait]
impl<F, Fut, Res> Handler for F
where
    F: FnOnce(Message) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: HandleResponse + 'static,
{
    async fn call(self, msg: Message) {
        let res = (self)(msg.clone()).await;
        res.into_response(&msg).await;
    }
}

/// A type-erased handler shared by every subscription of one registration.
pub type BoxedHandler = Arc<dyn Fn(Message) -> BoxFuture<'static, ()> + Send + Sync>;

/// Erases a handler's type.
pub fn into_handler<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(move |msg| handler.clone().call(msg))
}
