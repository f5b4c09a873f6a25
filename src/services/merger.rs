// src/services/merger.rs

//! Patch-only persistence of detail-scrape fields.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::Result;
use crate::models::DetailRecord;
use crate::storage::RecordStore;

#[derive(Clone)]
pub struct DetailMerger {
    store: Arc<dyn RecordStore>,
}

impl DetailMerger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Overwrite the record's detail attributes on its existing item.
    pub async fn patch<D: DetailRecord + Sync>(&self, record: &D) -> Result<()> {
        let key = record.key();
        match self.store.merge(D::TABLE, key, &record.attributes()).await {
            Ok(()) => {
                info!(table = %D::TABLE, key = %key, "Merged detail fields");
                Ok(())
            }
            Err(e) => {
                error!(table = %D::TABLE, key = %key, error = %e, "Failed to merge detail fields");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::error::AppError;
    use crate::models::{ItemKey, SeriesDetail, Table};
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_patch_missing_key_is_error_and_inserts_nothing() {
        let store = Arc::new(MemoryStore::new());
        let merger = DetailMerger::new(store.clone());
        let detail = SeriesDetail {
            key: ItemKey::new("asura", "ghost"),
            cover_url: "https://cdn.example.com/c.jpg".to_string(),
            short_url: String::new(),
            synopsis: String::new(),
            scraped_at: Utc::now(),
        };

        let err = merger.patch(&detail).await.unwrap_err();
        assert!(matches!(err, AppError::MergeNotFound { ref id, .. } if id == "ghost"));
        assert!(store.keys(Table::Series).await.is_empty());
    }
}
