//! In-memory queue for local runs and tests.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::queue::{FollowUpMessage, WorkQueue};

/// Queue that records every accepted batch.
#[derive(Default)]
pub struct MemoryQueue {
    batches: Mutex<Vec<Vec<FollowUpMessage>>>,
    calls: Mutex<usize>,
    failing_calls: Mutex<HashSet<usize>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`th call to `send_batch` (0-based).
    pub async fn fail_call(&self, n: usize) {
        self.failing_calls.lock().await.insert(n);
    }

    /// Number of `send_batch` calls, accepted or not.
    pub async fn calls(&self) -> usize {
        *self.calls.lock().await
    }

    /// Accepted batches in submission order.
    pub async fn batches(&self) -> Vec<Vec<FollowUpMessage>> {
        self.batches.lock().await.clone()
    }

    /// Every accepted message, flattened.
    pub async fn messages(&self) -> Vec<FollowUpMessage> {
        self.batches.lock().await.iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn send_batch(&self, messages: &[FollowUpMessage]) -> Result<usize> {
        let call = {
            let mut calls = self.calls.lock().await;
            *calls += 1;
            *calls - 1
        };

        if self.failing_calls.lock().await.contains(&call) {
            return Err(AppError::queue(format!("injected failure on call {call}")));
        }

        self.batches.lock().await.push(messages.to_vec());
        Ok(messages.len())
    }
}
