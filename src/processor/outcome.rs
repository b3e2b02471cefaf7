use std::collections::HashMap;

use crate::errors::{FailedMessage, FailureCause};

/// The outcome the processor produced for one message of the batch.
#[derive(Debug)]
pub enum ProcessingOutcome<R> {
    /// The handler produced a value for this message.
    Success {
        message_id: String,
        receipt_handle: String,
        value: R,
    },
    /// The message failed, either in the handler or at the
    /// acknowledgement stage.
    Failure {
        message_id: String,
        receipt_handle: String,
        cause: FailureCause,
    },
}

impl<R> ProcessingOutcome<R> {
    /// Identifier of the message this outcome belongs to.
    pub fn message_id(&self) -> &str {
        match self {
            ProcessingOutcome::Success { message_id, .. } => message_id,
            ProcessingOutcome::Failure { message_id, .. } => message_id,
        }
    }
}

/// All outcomes of one batch invocation, in batch input order.
///
/// Every input message contributes exactly one outcome. Successes can be
/// demoted to failures after the acknowledgement stage; order is
/// preserved throughout.
#[derive(Debug)]
pub struct BatchResult<R> {
    outcomes: Vec<ProcessingOutcome<R>>,
}

impl<R> BatchResult<R> {
    pub fn from_outcomes(outcomes: Vec<ProcessingOutcome<R>>) -> Self {
        BatchResult { outcomes }
    }

    pub fn outcomes(&self) -> &[ProcessingOutcome<R>] {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of outcomes currently counted as failures.
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ProcessingOutcome::Failure { .. }))
            .count()
    }

    /// Reclassifies the listed successes as failures, keyed by message id.
    ///
    /// Used after the acknowledgement stage: a message whose deletion was
    /// rejected stays on the queue and must be reported as failed even
    /// though its handler succeeded. Outcome order is unchanged.
    pub fn demote(&mut self, mut rejections: HashMap<String, FailureCause>) {
        if rejections.is_empty() {
            return;
        }
        for outcome in &mut self.outcomes {
            let ProcessingOutcome::Success {
                message_id,
                receipt_handle,
                ..
            } = &*outcome
            else {
                continue;
            };
            let Some(cause) = rejections.remove(message_id) else {
                continue;
            };
            let (message_id, receipt_handle) = (message_id.clone(), receipt_handle.clone());
            *outcome = ProcessingOutcome::Failure {
                message_id,
                receipt_handle,
                cause,
            };
        }
    }

    /// Decomposes into ordered success values and ordered failures.
    pub fn into_parts(self) -> (Vec<R>, Vec<FailedMessage>) {
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for outcome in self.outcomes {
            match outcome {
                ProcessingOutcome::Success { value, .. } => successes.push(value),
                ProcessingOutcome::Failure {
                    message_id, cause, ..
                } => failures.push(FailedMessage { message_id, cause }),
            }
        }

        (successes, failures)
    }
}
