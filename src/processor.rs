use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::client;
use crate::errors::{BatchProcessingError, ConfigurationError, FailureCause, HandlerError};
use crate::message::Message;

pub mod ack;
pub mod config;
pub mod handler;
pub mod outcome;

use self::ack::{AckEntry, AcknowledgeQueue, SqsAcknowledger};
use self::config::BatchProcessorConfig;
use self::handler::{FnMessageHandler, MessageHandler};
use self::outcome::{BatchResult, ProcessingOutcome};

/// Processes batches of SQS messages with per-message failure isolation.
///
/// For every message in a batch the configured handler runs exactly once.
/// Messages the handler accepts are deleted from the queue in groups of
/// at most [`ack::MAX_BATCH_DELETE_SIZE`]; messages it rejects, and
/// messages whose deletion the queue refuses, are reported in an
/// aggregate error (or logged, under suppression) and reappear through
/// queue redelivery. Duplicate delivery is reduced, never eliminated, so
/// handlers must be idempotent.
///
/// The generic queue parameter is the deletion seam; production code
/// builds a processor over [`SqsAcknowledger`] via [`Self::builder`],
/// tests substitute fakes with [`Self::with_queue`].
pub struct SqsBatchProcessor<Q = SqsAcknowledger>
where
    Q: AcknowledgeQueue,
{
    queue: Q,
    config: BatchProcessorConfig,
}

impl SqsBatchProcessor {
    /// Starts building a processor backed by a real SQS queue.
    pub fn builder() -> SqsBatchProcessorBuilder {
        SqsBatchProcessorBuilder::new()
    }
}

impl<Q> SqsBatchProcessor<Q>
where
    Q: AcknowledgeQueue,
{
    /// Creates a processor over an arbitrary [`AcknowledgeQueue`].
    pub fn with_queue(queue: Q, config: BatchProcessorConfig) -> Self {
        SqsBatchProcessor { queue, config }
    }

    /// Processes one batch and acknowledges the messages that succeeded.
    ///
    /// Handler failures never abort the rest of the batch. When every
    /// message succeeds (or `suppress_errors` is set) the handler's
    /// values are returned in batch input order; otherwise the aggregate
    /// [`BatchProcessingError`] carries both the values of the
    /// already-acknowledged successes and the per-message failure causes.
    ///
    /// An empty batch returns an empty `Vec` without touching the queue.
    /// Dropping the returned future abandons in-flight handler calls;
    /// nothing gets acknowledged, so the whole batch is redelivered.
    pub async fn process<H>(
        &self,
        batch: Vec<Message>,
        handler: &H,
    ) -> Result<Vec<H::Output>, BatchProcessingError<H::Output>>
    where
        H: MessageHandler,
        H::Output: fmt::Debug,
    {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = batch.len();
        let mut result = self.run_handlers(batch, handler).await;
        debug!(
            "handlers finished: {} of {} messages failed",
            result.failure_count(),
            batch_size
        );

        self.acknowledge_successes(&mut result).await;

        if self.config.delete_non_retryable_messages {
            self.dispose_non_retryable(&result).await;
        }

        report(result, self.config.suppress_errors)
    }

    /// Like [`Self::process`], with the handler given as an async closure.
    pub async fn process_with<F, Fut, R>(
        &self,
        batch: Vec<Message>,
        handler_fn: F,
    ) -> Result<Vec<R>, BatchProcessingError<R>>
    where
        F: Fn(Message) -> Fut + Send + Sync,
        Fut: Future<Output = Result<R, HandlerError>> + Send,
        R: Send + fmt::Debug,
    {
        self.process(batch, &FnMessageHandler::new(handler_fn)).await
    }

    /// Runs the handler once per message and collects one outcome per
    /// message, in batch input order.
    ///
    /// Invocations run with at most `max_concurrency` in flight; the
    /// buffered stream yields in input order, so no re-sorting is needed.
    async fn run_handlers<H>(&self, batch: Vec<Message>, handler: &H) -> BatchResult<H::Output>
    where
        H: MessageHandler,
    {
        let concurrency = self.config.max_concurrency.max(1);

        let outcomes = stream::iter(batch)
            .map(|message| async move {
                match handler.handle(&message).await {
                    Ok(value) => ProcessingOutcome::Success {
                        message_id: message.message_id,
                        receipt_handle: message.receipt_handle,
                        value,
                    },
                    Err(error) => {
                        debug!("handler failed for message {}: {}", message.message_id, error);
                        ProcessingOutcome::Failure {
                            message_id: message.message_id,
                            receipt_handle: message.receipt_handle,
                            cause: FailureCause::Handler(error),
                        }
                    }
                }
            })
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await;

        BatchResult::from_outcomes(outcomes)
    }

    /// Deletes the successful messages from the queue and demotes any the
    /// queue would not delete back into failures.
    async fn acknowledge_successes<R>(&self, result: &mut BatchResult<R>) {
        let entries: Vec<AckEntry> = result
            .outcomes()
            .iter()
            .filter_map(|outcome| match outcome {
                ProcessingOutcome::Success {
                    message_id,
                    receipt_handle,
                    ..
                } => Some(AckEntry::new(message_id.clone(), receipt_handle.clone())),
                ProcessingOutcome::Failure { .. } => None,
            })
            .collect();

        if entries.is_empty() {
            return;
        }

        let unacknowledged = ack::acknowledge(entries, &self.queue).await;
        let rejections: HashMap<String, FailureCause> = unacknowledged
            .into_iter()
            .map(|rejected| (rejected.message_id, rejected.cause))
            .collect();

        result.demote(rejections);
    }

    /// Deletes messages whose handler error was marked non-retryable.
    ///
    /// They stay reported as failures with their handler cause; deleting
    /// them only stops the queue from redelivering payloads that can
    /// never succeed. Deletion problems here are logged and dropped.
    async fn dispose_non_retryable<R>(&self, result: &BatchResult<R>) {
        let entries: Vec<AckEntry> = result
            .outcomes()
            .iter()
            .filter_map(|outcome| match outcome {
                ProcessingOutcome::Failure {
                    message_id,
                    receipt_handle,
                    cause: FailureCause::Handler(error),
                } if !error.is_retryable() => {
                    Some(AckEntry::new(message_id.clone(), receipt_handle.clone()))
                }
                _ => None,
            })
            .collect();

        if entries.is_empty() {
            return;
        }

        info!(
            "removing {} non-retryable messages from the queue",
            entries.len()
        );
        for rejected in ack::acknowledge(entries, &self.queue).await {
            warn!(
                "could not remove non-retryable message {} from the queue: {}",
                rejected.message_id, rejected.cause
            );
        }
    }
}

/// Turns a batch result into the caller-facing outcome.
///
/// No failures: the success values, in input order. Failures with
/// suppression off: the aggregate error carrying both sides. Failures
/// with suppression on: the success values, with each failure logged;
/// the failed messages stay on the queue for redelivery either way.
pub fn report<R: fmt::Debug>(
    result: BatchResult<R>,
    suppress: bool,
) -> Result<Vec<R>, BatchProcessingError<R>> {
    let (successes, failures) = result.into_parts();

    if failures.is_empty() {
        return Ok(successes);
    }

    if suppress {
        for failure in &failures {
            warn!(
                "message {} failed and stays on the queue for redelivery: {}",
                failure.message_id, failure.cause
            );
        }
        return Ok(successes);
    }

    Err(BatchProcessingError::new(successes, failures))
}

/// Builder for a processor backed by a real SQS queue.
///
/// The queue URL is required; everything else has a default. Without an
/// explicit client the process-wide default client is resolved at build
/// time (see [`client::default_sqs_client`]).
pub struct SqsBatchProcessorBuilder {
    queue_url: Option<String>,
    sqs_client: Option<aws_sdk_sqs::Client>,
    config: BatchProcessorConfig,
}

impl SqsBatchProcessorBuilder {
    fn new() -> Self {
        SqsBatchProcessorBuilder {
            queue_url: None,
            sqs_client: None,
            config: BatchProcessorConfig::default(),
        }
    }

    /// URL of the queue the batch was received from.
    pub fn queue_url(mut self, queue_url: impl Into<String>) -> Self {
        self.queue_url = Some(queue_url.into());
        self
    }

    /// Uses a specific SQS client instead of the process-wide default.
    pub fn sqs_client(mut self, sqs_client: aws_sdk_sqs::Client) -> Self {
        self.sqs_client = Some(sqs_client);
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: BatchProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Return successes instead of raising the aggregate error when some
    /// messages fail.
    pub fn suppress_errors(mut self, suppress_errors: bool) -> Self {
        self.config.suppress_errors = suppress_errors;
        self
    }

    /// Maximum number of handler invocations in flight at once.
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Also delete messages whose handler error is non-retryable.
    pub fn delete_non_retryable_messages(mut self, delete: bool) -> Self {
        self.config.delete_non_retryable_messages = delete;
        self
    }

    /// Builds the processor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingQueueUrl`] if no queue URL
    /// was provided. This check runs before any client resolution, so a
    /// misconfigured processor fails fast without touching AWS.
    pub async fn build(self) -> Result<SqsBatchProcessor, ConfigurationError> {
        let queue_url = self
            .queue_url
            .filter(|url| !url.is_empty())
            .ok_or(ConfigurationError::MissingQueueUrl)?;

        let sqs_client = match self.sqs_client {
            Some(sqs_client) => sqs_client,
            None => client::default_sqs_client().await,
        };

        Ok(SqsBatchProcessor {
            queue: SqsAcknowledger::new(sqs_client, queue_url),
            config: self.config,
        })
    }
}
