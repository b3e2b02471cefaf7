/// Configuration for the batch processor.
///
/// # Fields
/// - `suppress_errors`: return the successful values instead of raising
///   the aggregate error when some messages fail. Failed messages stay on
///   the queue for redelivery either way.
/// - `max_concurrency`: upper bound on handler invocations in flight at
///   once. `1` processes the batch sequentially. Result order follows
///   batch input order at any setting.
/// - `delete_non_retryable_messages`: also delete messages whose handler
///   error was marked non-retryable, so the queue does not redeliver
///   payloads that can never succeed. They are still reported as failures.
#[derive(Debug, Clone)]
pub struct BatchProcessorConfig {
    /// Log failures instead of raising the aggregate error.
    pub suppress_errors: bool,

    /// Maximum number of handler invocations in flight at once.
    pub max_concurrency: usize,

    /// Delete messages whose handler error is non-retryable.
    pub delete_non_retryable_messages: bool,
}

impl Default for BatchProcessorConfig {
    fn default() -> Self {
        BatchProcessorConfig {
            suppress_errors: false,
            max_concurrency: 1,
            delete_non_retryable_messages: false,
        }
    }
}
