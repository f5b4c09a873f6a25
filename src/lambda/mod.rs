// src/lambda/mod.rs

//! AWS Lambda handler for SQS-triggered ingestion.
//!
//! Every SQS record carries `RequestType`, `Provider` and `SourceUrl`
//! message attributes. Records are processed one after another:
//! 1. Decode the request from the message attributes
//! 2. Run the matching ingestion operation
//! 3. On an error a retry may fix, fail the invocation so SQS redelivers

use std::sync::Arc;

use aws_lambda_events::event::sqs::{SqsEvent, SqsMessage};
use lambda_runtime::{Error as LambdaError, LambdaEvent};
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::models::{Config, IngestRequest};
use crate::queue::sqs::SqsQueue;
use crate::services::{IngestOutcome, Ingestor};
use crate::storage::dynamodb::DynamoStore;
use crate::utils::http::HttpFetcher;

/// Build an ingestor wired to DynamoDB, SQS and HTTP from the environment.
pub async fn build_ingestor() -> Result<Ingestor> {
    let config = Config::from_env()?;
    info!(
        series_table = %config.tables.series,
        chapters_table = %config.tables.chapters,
        "Configuration loaded"
    );

    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoStore::new(aws_sdk_dynamodb::Client::new(&aws), config.tables.clone());
    let queue = SqsQueue::new(aws_sdk_sqs::Client::new(&aws), config.queue.url.clone());
    let fetcher = HttpFetcher::new(&config.fetch)?;

    Ingestor::new(&config, Arc::new(fetcher), Arc::new(store), Arc::new(queue))
}

/// Decode the ingestion request carried by one SQS record.
pub fn request_from_message(message: &SqsMessage) -> Result<IngestRequest> {
    IngestRequest::from_attributes(|name| {
        message
            .message_attributes
            .get(name)
            .and_then(|attr| attr.string_value.as_deref())
    })
}

/// Process one SQS record.
///
/// Returns `Err` only when a retry may succeed. Messages that can never
/// succeed (undecodable, or a detail for an unknown key) are logged and
/// dropped.
pub async fn process_record(ingestor: &Ingestor, record: &SqsMessage) -> Result<()> {
    let message_id = record.message_id.as_deref().unwrap_or_default();

    let request = match request_from_message(record) {
        Ok(request) => request,
        Err(e) => {
            warn!(message_id, error = %e, "Discarding undecodable message");
            return Ok(());
        }
    };

    match ingestor.handle(&request).await {
        Ok(IngestOutcome::Listed(report)) => {
            info!(
                message_id,
                stored = report.stored,
                enqueued = report.enqueued,
                failed = report.failed,
                "Message processed"
            );
            Ok(())
        }
        Ok(IngestOutcome::Merged(key)) => {
            info!(message_id, key = %key, "Message processed");
            Ok(())
        }
        Err(e) if e.is_retryable() => {
            error!(message_id, error = %e, "Message failed, leaving it for retry");
            Err(e)
        }
        Err(e) => {
            warn!(message_id, error = %e, "Discarding message that cannot succeed");
            Ok(())
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip_all, fields(records = event.payload.records.len()))]
pub async fn handler(
    ingestor: &Ingestor,
    event: LambdaEvent<SqsEvent>,
) -> std::result::Result<(), LambdaError> {
    let (payload, _context) = event.into_parts();

    for record in &payload.records {
        process_record(ingestor, record).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_lambda_events::event::sqs::SqsMessageAttribute;
    use lambda_runtime::Context;

    use super::*;
    use crate::error::AppError;
    use crate::models::{ItemKey, RequestType, Table};
    use crate::queue::MemoryQueue;
    use crate::storage::MemoryStore;
    use crate::utils::http::StaticFetcher;

    const LIST_URL: &str = "https://example.com/manga/list-mode/";
    const ALPHA_URL: &str = "https://example.com/manga/12-alpha/";

    fn attribute(value: &str) -> SqsMessageAttribute {
        SqsMessageAttribute {
            string_value: Some(value.to_string()),
            data_type: Some("String".to_string()),
            ..Default::default()
        }
    }

    fn message(request_type: &str, url: &str) -> SqsMessage {
        SqsMessage {
            message_id: Some(format!("{request_type}-1")),
            message_attributes: HashMap::from([
                ("RequestType".to_string(), attribute(request_type)),
                ("Provider".to_string(), attribute("asura")),
                ("SourceUrl".to_string(), attribute(url)),
            ]),
            ..Default::default()
        }
    }

    fn event(records: Vec<SqsMessage>) -> LambdaEvent<SqsEvent> {
        LambdaEvent::new(SqsEvent { records }, Context::default())
    }

    fn ingestor(store: Arc<MemoryStore>) -> Ingestor {
        let fetcher = StaticFetcher::new()
            .with_page(
                LIST_URL,
                r#"<div class="soralist"><a class="series" href="/manga/12-alpha/">Alpha</a></div>"#,
            )
            .with_page(
                ALPHA_URL,
                r#"<div class="thumb"><img src="https://cdn.example.com/alpha.jpg"></div>"#,
            );
        Ingestor::new(
            &Config::default(),
            Arc::new(fetcher),
            store,
            Arc::new(MemoryQueue::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_request_from_message_attributes() {
        let request = request_from_message(&message("chapter-list", ALPHA_URL)).unwrap();
        assert_eq!(request.request_type, RequestType::ChapterList);
        assert_eq!(request.source_url, ALPHA_URL);
    }

    #[test]
    fn test_request_from_message_without_attributes() {
        let err = request_from_message(&SqsMessage::default()).unwrap_err();
        assert!(matches!(err, AppError::MissingAttribute(_)));
    }

    #[tokio::test]
    async fn test_handler_processes_list_then_detail() {
        let store = Arc::new(MemoryStore::new());
        let ingestor = ingestor(store.clone());

        let records = vec![
            message("series-list", LIST_URL),
            message("series-data", ALPHA_URL),
        ];
        handler(&ingestor, event(records)).await.unwrap();

        let stored = store
            .get(Table::Series, &ItemKey::new("asura", "alpha"))
            .await
            .unwrap();
        assert!(stored.contains_key("SeriesCover"));
    }

    #[tokio::test]
    async fn test_handler_fails_on_transient_merge_error() {
        let store = Arc::new(MemoryStore::new());
        let ingestor = ingestor(store.clone());
        handler(&ingestor, event(vec![message("series-list", LIST_URL)]))
            .await
            .unwrap();
        store.fail_writes_for(ItemKey::new("asura", "alpha")).await;

        let result = handler(&ingestor, event(vec![message("series-data", ALPHA_URL)])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_handler_discards_detail_for_unknown_key() {
        let store = Arc::new(MemoryStore::new());
        let ingestor = ingestor(store.clone());

        let result = handler(&ingestor, event(vec![message("series-data", ALPHA_URL)])).await;
        assert!(result.is_ok());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_handler_discards_undecodable_message() {
        let ingestor = ingestor(Arc::new(MemoryStore::new()));
        let result = handler(&ingestor, event(vec![SqsMessage::default()])).await;
        assert!(result.is_ok());
    }
}
