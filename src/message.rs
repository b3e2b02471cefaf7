use crate::errors::ConfigurationError;

/// One unit of a batch, as delivered by the trigger.
///
/// The processor consumes already-decoded messages: every field it needs
/// is required here, so handlers and the acknowledgement stage never deal
/// with optional SDK fields. A message is immutable once received and is
/// owned for the lifetime of one batch invocation.
#[derive(Debug, Clone)]
pub struct Message {
    /// Identifier of the message, unique within the batch.
    pub message_id: String,
    /// Raw message payload.
    pub body: String,
    /// Opaque token required to delete the message from the queue.
    pub receipt_handle: String,
}

impl Message {
    /// Creates a message from its parts.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sqs_batch_processor::message::Message;
    ///
    /// let message = Message::new("id-1", "{\"order\":42}", "receipt-1");
    /// assert_eq!(message.message_id, "id-1");
    /// ```
    pub fn new(
        message_id: impl Into<String>,
        body: impl Into<String>,
        receipt_handle: impl Into<String>,
    ) -> Self {
        Message {
            message_id: message_id.into(),
            body: body.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

impl TryFrom<aws_sdk_sqs::types::Message> for Message {
    type Error = ConfigurationError;

    fn try_from(message: aws_sdk_sqs::types::Message) -> Result<Self, Self::Error> {
        let message_id = message
            .message_id
            .ok_or(ConfigurationError::MissingMessageField("message_id"))?;
        let body = message
            .body
            .ok_or(ConfigurationError::MissingMessageField("body"))?;
        let receipt_handle = message
            .receipt_handle
            .ok_or(ConfigurationError::MissingMessageField("receipt_handle"))?;

        Ok(Message {
            message_id,
            body,
            receipt_handle,
        })
    }
}

/// Converts a batch of SDK messages into decoded [`Message`] records.
///
/// Fails fast on the first malformed record so no partial work happens on
/// a batch the queue delivered incompletely.
pub fn from_sdk_messages(
    messages: Vec<aws_sdk_sqs::types::Message>,
) -> Result<Vec<Message>, ConfigurationError> {
    messages.into_iter().map(Message::try_from).collect()
}
