use std::env;

use sqs_batch_processor::client::create_sqs_client_from_env;
use sqs_batch_processor::errors::HandlerError;
use sqs_batch_processor::message::{self, Message};
use sqs_batch_processor::processor::SqsBatchProcessor;

/// End-to-end run against a real queue. Requires AWS credentials and
/// `TEST_SQS_QUEUE_URL` in the environment (or a `.env` file).
///
/// Run with: `cargo test --test integration_test -- --ignored`
#[tokio::test]
#[ignore = "requires a live SQS queue and AWS credentials"]
async fn processes_and_acknowledges_live_batch() {
    dotenvy::dotenv().ok();

    let queue_url = env::var("TEST_SQS_QUEUE_URL").expect("TEST_SQS_QUEUE_URL must be set");
    let sqs_client = create_sqs_client_from_env().await;

    for n in 1..=3 {
        sqs_client
            .send_message()
            .queue_url(&queue_url)
            .message_body(format!("live test message {n}"))
            .send()
            .await
            .expect("failed to send test message");
    }

    let received = sqs_client
        .receive_message()
        .queue_url(&queue_url)
        .max_number_of_messages(10)
        .wait_time_seconds(20)
        .send()
        .await
        .expect("failed to receive messages");

    let batch = message::from_sdk_messages(received.messages.unwrap_or_default())
        .expect("queue delivered a malformed message");
    assert!(!batch.is_empty(), "expected at least one message");
    let batch_size = batch.len();

    let processor = SqsBatchProcessor::builder()
        .queue_url(&queue_url)
        .sqs_client(sqs_client.clone())
        .build()
        .await
        .expect("processor configuration is complete");

    let results = processor
        .process_with(batch, |message: Message| async move {
            println!("processing live message {}", message.message_id);
            Ok::<_, HandlerError>(message.body.len())
        })
        .await
        .expect("every live message should process");

    assert_eq!(results.len(), batch_size);

    // Everything was acknowledged; an immediate short poll should come
    // back empty rather than redelivering.
    let redelivered = sqs_client
        .receive_message()
        .queue_url(&queue_url)
        .max_number_of_messages(10)
        .wait_time_seconds(1)
        .send()
        .await
        .expect("failed to poll for redelivery");
    assert!(redelivered.messages.unwrap_or_default().is_empty());
}
