//! Service layer for the ingestion pipeline.
//!
//! This module contains the business logic for:
//! - Page extraction per site theme (`Extractor`)
//! - Insert-only summary writes (`ConditionalWriter`)
//! - Patch-only detail merges (`DetailMerger`)
//! - Follow-up fan-out (`FanoutDispatcher`)
//! - Request dispatch (`Ingestor`)

pub mod extract;
mod fanout;
mod ingest;
mod merger;
mod writer;

pub use extract::{Extractor, ExtractorRegistry, PageContext};
pub use fanout::{FanoutDispatcher, FanoutReport, dedup_token};
pub use ingest::{IngestOutcome, Ingestor, ListReport};
pub use merger::DetailMerger;
pub use writer::{ConditionalWriter, WriteSummary};
