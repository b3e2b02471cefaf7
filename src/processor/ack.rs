use async_trait::async_trait;
use aws_sdk_sqs::types::DeleteMessageBatchRequestEntry;
use tracing::{debug, error, warn};

use crate::errors::{FailureCause, QueueTransportError};

/// Maximum number of entries SQS accepts in one `DeleteMessageBatch` call.
pub const MAX_BATCH_DELETE_SIZE: usize = 10;

/// One entry of a batch deletion call: the message to remove and the
/// token proving we received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckEntry {
    /// Identifier of the message to delete.
    pub message_id: String,
    /// Receipt handle from the delivery being acknowledged.
    pub receipt_handle: String,
}

impl AckEntry {
    pub fn new(message_id: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        AckEntry {
            message_id: message_id.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

/// A single entry the queue refused to delete in an otherwise-successful
/// batch deletion call.
#[derive(Debug, Clone)]
pub struct EntryRejection {
    /// Identifier of the rejected message.
    pub message_id: String,
    /// Provider error code.
    pub code: String,
    /// Provider-supplied detail, when present.
    pub message: Option<String>,
}

/// Result of one batch deletion call that reached the queue.
///
/// An empty `rejected` list means every entry in the group was deleted.
#[derive(Debug, Default)]
pub struct DeleteOutcome {
    /// Entries the queue rejected; the rest of the group was deleted.
    pub rejected: Vec<EntryRejection>,
}

/// Capability to delete one group of messages from a queue.
///
/// This is the seam between the batching logic and the queue transport:
/// the real implementation is [`SqsAcknowledger`], and tests substitute
/// fakes that record or reject groups.
#[async_trait]
pub trait AcknowledgeQueue: Send + Sync {
    /// Deletes one group of at most [`MAX_BATCH_DELETE_SIZE`] entries.
    ///
    /// Returns `Err` only when the call itself fails (network or provider
    /// outage). Per-entry refusals are reported through the returned
    /// [`DeleteOutcome`].
    async fn delete_batch(&self, entries: &[AckEntry]) -> Result<DeleteOutcome, QueueTransportError>;
}

/// [`AcknowledgeQueue`] backed by `DeleteMessageBatch` against a real
/// SQS queue.
#[derive(Debug, Clone)]
pub struct SqsAcknowledger {
    sqs_client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsAcknowledger {
    pub fn new(sqs_client: aws_sdk_sqs::Client, queue_url: String) -> Self {
        SqsAcknowledger {
            sqs_client,
            queue_url,
        }
    }

    /// URL of the queue this acknowledger deletes from.
    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl AcknowledgeQueue for SqsAcknowledger {
    async fn delete_batch(&self, entries: &[AckEntry]) -> Result<DeleteOutcome, QueueTransportError> {
        let mut request_entries = Vec::with_capacity(entries.len());
        for entry in entries {
            // Message ids are unique within a batch and use the charset SQS
            // allows for entry ids, so rejections map straight back to messages.
            let request_entry = DeleteMessageBatchRequestEntry::builder()
                .id(entry.message_id.clone())
                .receipt_handle(entry.receipt_handle.clone())
                .build()
                .map_err(|e| {
                    QueueTransportError::new(format!(
                        "invalid delete entry for message {}: {e}",
                        entry.message_id
                    ))
                })?;
            request_entries.push(request_entry);
        }

        let output = self
            .sqs_client
            .delete_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(request_entries))
            .send()
            .await
            .map_err(|e| QueueTransportError::new(format!("delete message batch failed: {e}")))?;

        let rejected = output
            .failed()
            .iter()
            .map(|failed_entry| EntryRejection {
                message_id: failed_entry.id().to_string(),
                code: failed_entry.code().to_string(),
                message: failed_entry.message().map(str::to_string),
            })
            .collect();

        Ok(DeleteOutcome { rejected })
    }
}

/// A message that could not be acknowledged, with the cause to record
/// against it.
#[derive(Debug)]
pub struct RejectedEntry {
    pub message_id: String,
    pub cause: FailureCause,
}

/// Deletes the given entries from the queue in groups of at most
/// [`MAX_BATCH_DELETE_SIZE`], preserving input order.
///
/// Groups are independent: a failed deletion call demotes only its own
/// group and the remaining groups are still attempted. Each entry is
/// deleted at most once per invocation.
///
/// Returns the entries that remain on the queue, with a transport-level
/// cause when the whole call failed or the provider's rejection code when
/// only that entry was refused.
pub async fn acknowledge<Q>(entries: Vec<AckEntry>, queue: &Q) -> Vec<RejectedEntry>
where
    Q: AcknowledgeQueue + ?Sized,
{
    let mut unacknowledged = Vec::new();

    for group in entries.chunks(MAX_BATCH_DELETE_SIZE) {
        match queue.delete_batch(group).await {
            Ok(outcome) => {
                debug!(
                    "deleted group of {} messages, {} rejected",
                    group.len(),
                    outcome.rejected.len()
                );
                for rejection in outcome.rejected {
                    warn!(
                        "queue rejected deletion of message {} ({})",
                        rejection.message_id, rejection.code
                    );
                    unacknowledged.push(RejectedEntry {
                        message_id: rejection.message_id,
                        cause: FailureCause::AcknowledgementRejected {
                            code: rejection.code,
                            message: rejection.message,
                        },
                    });
                }
            }
            Err(transport_error) => {
                error!(
                    "failed to delete group of {} messages: {}",
                    group.len(),
                    transport_error
                );
                for entry in group {
                    unacknowledged.push(RejectedEntry {
                        message_id: entry.message_id.clone(),
                        cause: FailureCause::Acknowledgement(transport_error.clone()),
                    });
                }
            }
        }
    }

    unacknowledged
}
