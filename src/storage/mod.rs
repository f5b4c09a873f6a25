//! Storage abstractions for series and chapter persistence.
//!
//! Both logical tables are keyed by `(provider, id)`:
//!
//! ```text
//! series    WebtoonProvider / SeriesId   summary attrs + detail attrs
//! chapters  SeriesProvider  / ChapterId  summary attrs + detail attrs
//! ```
//!
//! Summaries are written with an insert-if-absent primitive; details are
//! merged onto an existing item and never create one.

#[cfg(feature = "aws")]
pub mod dynamodb;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Attributes, ItemKey, Table};

// Re-export for convenience
pub use memory::MemoryStore;

/// Outcome of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was new and the item is now stored
    Created,
    /// An item with the key already existed; nothing was written
    Duplicate,
}

/// Trait for key-value store backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert `attributes` under `key` only if no item with that key exists.
    ///
    /// A failed existence check is reported as [`InsertOutcome::Duplicate`],
    /// not as an error.
    async fn insert_if_absent(
        &self,
        table: Table,
        key: &ItemKey,
        attributes: &Attributes,
    ) -> Result<InsertOutcome>;

    /// Overwrite `attributes` on the existing item at `key`, leaving every
    /// other attribute untouched.
    ///
    /// Fails with `AppError::MergeNotFound` when the key is absent.
    async fn merge(&self, table: Table, key: &ItemKey, attributes: &Attributes) -> Result<()>;
}
