// src/models/mod.rs

//! Domain models for the ingestion pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod chapter;
mod config;
mod item;
mod request;
mod series;

// Re-export all public types
pub use chapter::{ChapterDetail, ChapterSummary};
pub use config::{
    Config, FetchConfig, MAX_BATCH_SIZE, ProviderConfig, QueueConfig, TableConfig, Theme,
};
pub use item::{
    Attribute, Attributes, DetailRecord, ItemKey, SummaryRecord, Table, scrape_date,
};
pub use request::{ATTR_PROVIDER, ATTR_REQUEST_TYPE, ATTR_SOURCE_URL, IngestRequest, RequestType};
pub use series::{SeriesDetail, SeriesSummary};
