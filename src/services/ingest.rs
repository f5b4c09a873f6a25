// src/services/ingest.rs

//! Ingestion operations.
//!
//! List requests: fetch → extract summaries → conditional insert of each →
//! fan out one follow-up per newly created summary.
//! Detail requests: fetch → extract one detail → merge onto the stored item.

use std::sync::Arc;

use scraper::Html;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::{Config, IngestRequest, ItemKey, RequestType, SummaryRecord};
use crate::queue::WorkQueue;
use crate::services::extract::{Extractor, ExtractorRegistry, PageContext, parse_page};
use crate::services::fanout::{FanoutDispatcher, FanoutReport};
use crate::services::merger::DetailMerger;
use crate::services::writer::ConditionalWriter;
use crate::storage::RecordStore;
use crate::utils::http::PageFetcher;

/// Counts from one list ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListReport {
    pub discovered: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub enqueued: usize,
    pub dropped: usize,
}

/// What a handled request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Listed(ListReport),
    Merged(ItemKey),
}

/// Runs the ingestion operations against one set of backends.
pub struct Ingestor {
    fetcher: Arc<dyn PageFetcher>,
    registry: ExtractorRegistry,
    writer: ConditionalWriter,
    merger: DetailMerger,
    fanout: FanoutDispatcher,
}

impl Ingestor {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn RecordStore>,
        queue: Arc<dyn WorkQueue>,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            registry: ExtractorRegistry::new(config.providers.clone())?,
            writer: ConditionalWriter::new(store.clone()),
            merger: DetailMerger::new(store),
            fanout: FanoutDispatcher::new(queue, &config.queue),
        })
    }

    /// Route a decoded request to its operation.
    #[instrument(skip_all, fields(request_type = %request.request_type, provider = %request.provider))]
    pub async fn handle(&self, request: &IngestRequest) -> Result<IngestOutcome> {
        let provider = request.provider.as_str();
        let url = request.source_url.as_str();

        let result = match request.request_type {
            RequestType::SeriesList => self
                .series_list(provider, url)
                .await
                .map(IngestOutcome::Listed),
            RequestType::ChapterList => self
                .chapter_list(provider, url)
                .await
                .map(IngestOutcome::Listed),
            RequestType::SeriesData => self
                .series_detail(provider, url)
                .await
                .map(IngestOutcome::Merged),
            RequestType::ChapterData => self
                .chapter_detail(provider, url)
                .await
                .map(IngestOutcome::Merged),
        };

        if let Err(e) = &result {
            error!(url, error = %e, "Ingestion failed");
        }
        result
    }

    pub async fn series_list(&self, provider: &str, url: &str) -> Result<ListReport> {
        let extractor = self.registry.for_provider(provider)?;
        let html = self.fetcher.fetch(url).await?;
        let series = extract(extractor, provider, url, &html, |e, page, ctx| {
            e.series_list(page, ctx)
        })?;
        info!(url, count = series.len(), "Extracted series");
        Ok(self.store_and_fan_out(&series).await)
    }

    pub async fn chapter_list(&self, provider: &str, url: &str) -> Result<ListReport> {
        let extractor = self.registry.for_provider(provider)?;
        let html = self.fetcher.fetch(url).await?;
        let chapters = extract(extractor, provider, url, &html, |e, page, ctx| {
            e.chapter_list(page, ctx)
        })?;
        info!(url, count = chapters.len(), "Extracted chapters");
        Ok(self.store_and_fan_out(&chapters).await)
    }

    pub async fn series_detail(&self, provider: &str, url: &str) -> Result<ItemKey> {
        let extractor = self.registry.for_provider(provider)?;
        let html = self.fetcher.fetch(url).await?;
        let detail = extract(extractor, provider, url, &html, |e, page, ctx| {
            e.series_detail(page, ctx)
        })?;
        self.merger.patch(&detail).await?;
        Ok(detail.key)
    }

    pub async fn chapter_detail(&self, provider: &str, url: &str) -> Result<ItemKey> {
        let extractor = self.registry.for_provider(provider)?;
        let html = self.fetcher.fetch(url).await?;
        let detail = extract(extractor, provider, url, &html, |e, page, ctx| {
            e.chapter_detail(page, ctx)
        })?;
        self.merger.patch(&detail).await?;
        Ok(detail.key)
    }

    async fn store_and_fan_out<R: SummaryRecord + Sync>(&self, records: &[R]) -> ListReport {
        let written = self.writer.write_all(records).await;
        let FanoutReport { sent, dropped, .. } = self.fanout.dispatch(&written.created).await;

        let report = ListReport {
            discovered: records.len(),
            stored: written.created.len(),
            duplicates: written.duplicates,
            failed: written.failed,
            enqueued: sent,
            dropped,
        };
        info!(
            discovered = report.discovered,
            stored = report.stored,
            duplicates = report.duplicates,
            failed = report.failed,
            enqueued = report.enqueued,
            "List ingestion complete"
        );
        report
    }
}

/// Parse and extract synchronously so the parsed document never lives
/// across an await point.
fn extract<T>(
    extractor: &dyn Extractor,
    provider: &str,
    url: &str,
    html: &str,
    f: impl FnOnce(&dyn Extractor, &Html, &PageContext<'_>) -> Result<T>,
) -> Result<T> {
    let page = parse_page(html);
    let ctx = PageContext::new(provider, url);
    f(extractor, &page, &ctx)
}
