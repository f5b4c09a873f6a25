// src/services/writer.rs

//! Insert-only persistence of list-scrape summaries.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::SummaryRecord;
use crate::storage::{InsertOutcome, RecordStore};

/// Result of writing a batch of summaries.
#[derive(Debug)]
pub struct WriteSummary<'a, R> {
    /// Records whose key was new, in discovery order
    pub created: Vec<&'a R>,
    pub duplicates: usize,
    pub failed: usize,
}

/// Writes summaries only when their key is not stored yet.
#[derive(Clone)]
pub struct ConditionalWriter {
    store: Arc<dyn RecordStore>,
}

impl ConditionalWriter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Insert one summary guarded by key absence.
    pub async fn try_insert<R: SummaryRecord + Sync>(&self, record: &R) -> Result<InsertOutcome> {
        let outcome = self
            .store
            .insert_if_absent(R::TABLE, record.key(), &record.attributes())
            .await?;
        if outcome == InsertOutcome::Duplicate {
            debug!(table = %R::TABLE, key = %record.key(), "Already stored, skipping");
        }
        Ok(outcome)
    }

    /// Insert every record in turn. A store failure is logged and only
    /// affects that record.
    pub async fn write_all<'a, R: SummaryRecord + Sync>(
        &self,
        records: &'a [R],
    ) -> WriteSummary<'a, R> {
        let mut summary = WriteSummary {
            created: Vec::new(),
            duplicates: 0,
            failed: 0,
        };

        for record in records {
            match self.try_insert(record).await {
                Ok(InsertOutcome::Created) => summary.created.push(record),
                Ok(InsertOutcome::Duplicate) => summary.duplicates += 1,
                Err(e) => {
                    warn!(table = %R::TABLE, key = %record.key(), error = %e, "Failed to store record");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
