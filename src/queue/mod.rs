//! Follow-up work queue.
//!
//! Messages are submitted in batches. A backend reports how many messages
//! of a batch it accepted; rejected entries are logged by the backend.

pub mod memory;
#[cfg(feature = "aws")]
pub mod sqs;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::RequestType;

pub use memory::MemoryQueue;

/// A follow-up fetch request staged on the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpMessage {
    /// Unique per message
    pub id: String,
    /// Equal for messages the queue should treat as one
    pub dedup_token: String,
    /// Ordering group, the provider
    pub group_key: String,
    pub body: String,
    pub request_type: RequestType,
    pub provider: String,
    pub source_url: String,
}

/// Trait for queue backends.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Submit one batch. Returns the number of messages accepted.
    ///
    /// An `Err` means the whole batch was rejected.
    async fn send_batch(&self, messages: &[FollowUpMessage]) -> Result<usize>;
}
