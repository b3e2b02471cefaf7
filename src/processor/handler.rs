use async_trait::async_trait;
use std::future::Future;

use crate::errors::HandlerError;
use crate::message::Message;

/// Per-message processing logic, supplied by the caller.
///
/// A handler is polymorphic over a single operation: process one message
/// and return a value, or fail with a [`HandlerError`]. It carries no
/// batch awareness; failure isolation, acknowledgement, and reporting are
/// the processor's job. Because any message left on the queue is
/// redelivered, implementations must be idempotent.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Value produced for each successfully processed message.
    type Output: Send;

    /// Processes one message.
    ///
    /// The processor invokes this exactly once per message in the batch;
    /// retry happens only through queue redelivery in a later batch.
    async fn handle(&self, message: &Message) -> Result<Self::Output, HandlerError>;
}

/// [`MessageHandler`] built from an async function or closure.
///
/// Lets callers pass per-message logic inline instead of defining a
/// handler type:
///
/// ```rust
/// use sqs_batch_processor::errors::HandlerError;
/// use sqs_batch_processor::message::Message;
/// use sqs_batch_processor::processor::handler::FnMessageHandler;
///
/// let handler = FnMessageHandler::new(|message: Message| async move {
///     Ok::<_, HandlerError>(message.body.len())
/// });
/// ```
pub struct FnMessageHandler<F> {
    handler_fn: F,
}

impl<F> FnMessageHandler<F> {
    /// Wraps an async function as a message handler.
    pub fn new(handler_fn: F) -> Self {
        FnMessageHandler { handler_fn }
    }
}

#[async_trait]
impl<F, Fut, R> MessageHandler for FnMessageHandler<F>
where
    F: Fn(Message) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, HandlerError>> + Send,
    R: Send,
{
    type Output = R;

    async fn handle(&self, message: &Message) -> Result<R, HandlerError> {
        (self.handler_fn)(message.clone()).await
    }
}
