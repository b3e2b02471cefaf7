use std::error::Error;
use std::fmt;

use thiserror::Error;

/// Error returned by a message handler for a single message.
///
/// A handler failure is recorded against its message and never aborts the
/// rest of the batch. The `retryable` flag tells the processor whether
/// redelivering the message could ever succeed; errors are retryable
/// unless constructed with [`HandlerError::non_retryable`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    retryable: bool,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl HandlerError {
    /// Creates a retryable handler error with the provided message.
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError {
            message: message.into(),
            retryable: true,
            source: None,
        }
    }

    /// Creates a handler error for which redelivery is pointless, such as
    /// a permanently malformed payload.
    pub fn non_retryable(message: impl Into<String>) -> Self {
        HandlerError {
            message: message.into(),
            retryable: false,
            source: None,
        }
    }

    /// Attaches the underlying error that caused this failure.
    pub fn with_source(mut self, source: Box<dyn Error + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    /// Whether redelivering the message could succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        HandlerError::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        HandlerError::new(message)
    }
}

/// Transport-level failure of a batch deletion call.
///
/// Covers network and provider outages where the call itself fails, as
/// opposed to the provider rejecting individual entries.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct QueueTransportError(String);

impl QueueTransportError {
    /// Creates a new `QueueTransportError` with the provided message.
    pub fn new(message: String) -> Self {
        QueueTransportError(message)
    }
}

impl From<String> for QueueTransportError {
    fn from(message: String) -> Self {
        QueueTransportError::new(message)
    }
}

/// Why a message ended up in the failure half of a batch result.
///
/// Handler failures and acknowledgement failures are kept distinct so a
/// caller can tell "the message could not be processed" apart from "the
/// message was processed but could not be removed from the queue".
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The handler failed for this message.
    #[error("handler failed: {0}")]
    Handler(#[source] HandlerError),

    /// The deletion call covering this message's group failed outright.
    #[error("failed to delete message from queue: {0}")]
    Acknowledgement(#[source] QueueTransportError),

    /// The queue accepted the deletion call but rejected this entry.
    #[error("queue rejected deletion ({code}): {}", .message.as_deref().unwrap_or("no detail"))]
    AcknowledgementRejected {
        /// Provider error code for the rejected entry.
        code: String,
        /// Provider-supplied detail, when present.
        message: Option<String>,
    },
}

/// One failed message: its identifier and the cause of the failure.
#[derive(Debug)]
pub struct FailedMessage {
    /// Identifier of the failed message.
    pub message_id: String,
    /// What went wrong for this message.
    pub cause: FailureCause,
}

/// Aggregate error for a batch in which at least one message failed.
///
/// Carries the full outcome of the invocation: the values produced for
/// the messages that succeeded (and were already removed from the queue)
/// alongside the per-message failure causes, both in batch input order.
/// Callers can therefore react to partial success even though the call
/// as a whole failed.
#[derive(Debug, Error)]
#[error("{} of {} messages failed batch processing", .failures.len(), .failures.len() + .successes.len())]
pub struct BatchProcessingError<R: fmt::Debug> {
    successes: Vec<R>,
    failures: Vec<FailedMessage>,
}

impl<R: fmt::Debug> BatchProcessingError<R> {
    pub(crate) fn new(successes: Vec<R>, failures: Vec<FailedMessage>) -> Self {
        BatchProcessingError {
            successes,
            failures,
        }
    }

    /// Values returned by the handler for the messages that succeeded,
    /// in batch input order.
    pub fn success_values(&self) -> &[R] {
        &self.successes
    }

    /// The messages that failed, with their causes, in batch input order.
    pub fn failures(&self) -> &[FailedMessage] {
        &self.failures
    }

    /// Decomposes the error into its success values and failures.
    pub fn into_parts(self) -> (Vec<R>, Vec<FailedMessage>) {
        (self.successes, self.failures)
    }
}

/// Error raised before any batch work begins.
///
/// Configuration problems fail fast: no message is processed and no
/// queue call is made.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The processor was built without a queue URL.
    #[error("a queue URL must be configured before processing")]
    MissingQueueUrl,

    /// The process-wide SQS client was already initialized, either by an
    /// earlier override or by lazy construction on first use.
    #[error("the default SQS client is already initialized and can no longer be overridden")]
    ClientAlreadyInitialized,

    /// A received message is missing a field the processor requires.
    #[error("received message is missing required field `{0}`")]
    MissingMessageField(&'static str),
}
