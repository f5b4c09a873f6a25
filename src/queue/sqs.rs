//! SQS FIFO queue implementation.

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{MessageAttributeValue, SendMessageBatchRequestEntry};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::{ATTR_PROVIDER, ATTR_REQUEST_TYPE, ATTR_SOURCE_URL};
use crate::queue::{FollowUpMessage, WorkQueue};

/// Queue backed by an SQS FIFO queue.
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }
}

fn string_attribute(value: &str) -> Result<MessageAttributeValue> {
    MessageAttributeValue::builder()
        .data_type("String")
        .string_value(value)
        .build()
        .map_err(AppError::queue)
}

fn to_entry(message: &FollowUpMessage) -> Result<SendMessageBatchRequestEntry> {
    SendMessageBatchRequestEntry::builder()
        .id(&message.id)
        .message_body(&message.body)
        .message_group_id(&message.group_key)
        .message_deduplication_id(&message.dedup_token)
        .message_attributes(
            ATTR_REQUEST_TYPE,
            string_attribute(message.request_type.as_str())?,
        )
        .message_attributes(ATTR_PROVIDER, string_attribute(&message.provider)?)
        .message_attributes(ATTR_SOURCE_URL, string_attribute(&message.source_url)?)
        .build()
        .map_err(AppError::queue)
}

#[async_trait]
impl WorkQueue for SqsQueue {
    async fn send_batch(&self, messages: &[FollowUpMessage]) -> Result<usize> {
        let entries = messages.iter().map(to_entry).collect::<Result<Vec<_>>>()?;

        let output = self
            .client
            .send_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(|e| AppError::queue(DisplayErrorContext(&e)))?;

        for failed in output.failed() {
            warn!(
                entry = failed.id(),
                code = failed.code(),
                message = failed.message().unwrap_or_default(),
                "Queue rejected message"
            );
        }

        Ok(output.successful().len())
    }
}
