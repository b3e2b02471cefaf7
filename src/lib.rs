//! # SQS Batch Processor
//!
//! A partial-failure batch processor for AWS SQS messages: each message in a
//! batch is processed independently through a caller-supplied handler, only
//! the messages that succeeded are deleted from the queue, and failures are
//! reported in an aggregate error that preserves both the successful results
//! and the per-message causes.
//!
//! ## Features
//!
//! - Per-message failure isolation with continue-on-error semantics
//! - Batched acknowledgement under the SQS 10-entry delete limit, handling
//!   per-entry rejections as well as whole-call transport failures
//! - Suppress-or-raise reporting of partial failures
//! - Trait-based handler system with both functional and object-oriented
//!   API patterns
//! - Optional bounded-concurrency execution with input-order results
//! - Process-wide default client with a one-time override for custom
//!   region/credential configuration
//!
//! Messages that are not acknowledged reappear through queue redelivery, so
//! handlers must be idempotent: this crate reduces duplicate delivery, it
//! never eliminates it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqs_batch_processor::errors::HandlerError;
//! use sqs_batch_processor::message::Message;
//! use sqs_batch_processor::processor::SqsBatchProcessor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = SqsBatchProcessor::builder()
//!         .queue_url("https://sqs.us-east-1.amazonaws.com/123456789012/orders")
//!         .build()
//!         .await?;
//!
//!     // Decoded from the trigger event in a real deployment.
//!     let batch = vec![Message::new("id-1", "{\"order\":42}", "receipt-1")];
//!
//!     let results = processor
//!         .process_with(batch, |message: Message| async move {
//!             println!("processing message {}", message.message_id);
//!             Ok::<_, HandlerError>(message.body.len())
//!         })
//!         .await?;
//!
//!     println!("processed {} messages", results.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod errors;
pub mod message;
pub mod processor;
