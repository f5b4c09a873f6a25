// src/services/fanout.rs

//! Follow-up fan-out for newly stored summaries.
//!
//! Every created summary becomes one follow-up message asking for its detail
//! page. Messages are deduplicated by token, chunked into batches of at most
//! [`MAX_BATCH_SIZE`], and submitted batch by batch. A rejected batch is
//! logged and dropped without stopping the remaining batches.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{MAX_BATCH_SIZE, QueueConfig, SummaryRecord};
use crate::queue::{FollowUpMessage, WorkQueue};

/// Counts from one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Distinct messages built
    pub messages: usize,
    /// Messages dropped because their token repeated
    pub collapsed: usize,
    /// Batch submissions attempted
    pub batches: usize,
    /// Messages the queue accepted
    pub sent: usize,
    /// Messages lost to rejected batches or entries
    pub dropped: usize,
}

/// Deduplication token for a follow-up on `source_url`.
///
/// Equal URLs inside the same `window_secs` bucket give equal tokens. A zero
/// window yields the bare URL hash.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use manga_crawler::services::dedup_token;
///
/// let at = Utc.timestamp_opt(120, 0).unwrap();
/// assert!(dedup_token("https://example.com/a/", at, 60).starts_with("2-"));
/// assert_eq!(dedup_token("https://example.com/a/", at, 0).len(), 64);
/// ```
pub fn dedup_token(source_url: &str, now: DateTime<Utc>, window_secs: u64) -> String {
    let hash = hex::encode(Sha256::digest(source_url.as_bytes()));
    if window_secs == 0 {
        return hash;
    }
    let bucket = now.timestamp().max(0) as u64 / window_secs;
    format!("{bucket}-{hash}")
}

#[derive(Clone)]
pub struct FanoutDispatcher {
    queue: Arc<dyn WorkQueue>,
    batch_size: usize,
    dedup_window_secs: u64,
}

impl FanoutDispatcher {
    pub fn new(queue: Arc<dyn WorkQueue>, config: &QueueConfig) -> Self {
        Self {
            queue,
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
            dedup_window_secs: config.dedup_window_secs,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Build the follow-up message for a stored summary.
    pub fn message_for<R: SummaryRecord>(&self, record: &R, now: DateTime<Utc>) -> FollowUpMessage {
        let key = record.key();
        FollowUpMessage {
            id: Uuid::new_v4().to_string(),
            dedup_token: dedup_token(record.source_url(), now, self.dedup_window_secs),
            group_key: key.provider.clone(),
            body: format!("{} of {}", R::FOLLOW_UP, key.id),
            request_type: R::FOLLOW_UP,
            provider: key.provider.clone(),
            source_url: record.source_url().to_string(),
        }
    }

    pub async fn dispatch<R: SummaryRecord + Sync>(&self, records: &[&R]) -> FanoutReport {
        self.dispatch_at(records, Utc::now()).await
    }

    /// Dispatch with an explicit clock reading for the dedup bucket.
    pub async fn dispatch_at<R: SummaryRecord + Sync>(
        &self,
        records: &[&R],
        now: DateTime<Utc>,
    ) -> FanoutReport {
        let mut report = FanoutReport::default();
        let mut seen = HashSet::new();
        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            let message = self.message_for(*record, now);
            if seen.insert(message.dedup_token.clone()) {
                messages.push(message);
            } else {
                report.collapsed += 1;
            }
        }
        report.messages = messages.len();

        for batch in messages.chunks(self.batch_size) {
            report.batches += 1;
            match self.queue.send_batch(batch).await {
                Ok(accepted) => {
                    let accepted = accepted.min(batch.len());
                    report.sent += accepted;
                    report.dropped += batch.len() - accepted;
                }
                Err(e) => {
                    warn!(
                        batch = report.batches,
                        size = batch.len(),
                        error = %e,
                        "Dropping follow-up batch"
                    );
                    report.dropped += batch.len();
                }
            }
        }

        if report.messages > 0 {
            info!(
                messages = report.messages,
                batches = report.batches,
                sent = report.sent,
                dropped = report.dropped,
                "Dispatched follow-ups"
            );
        }
        report
    }
}
