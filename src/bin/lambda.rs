//! AWS Lambda entry point for the manga crawler.
//!
//! Deploy with `cargo lambda build --release --features lambda` and attach
//! the function to the follow-up SQS queue.

use std::sync::Arc;

use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manga_crawler::lambda::{build_ingestor, handler};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let ingestor = Arc::new(build_ingestor().await?);
    info!("Manga crawler Lambda starting...");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<SqsEvent>| {
        let ingestor = Arc::clone(&ingestor);
        async move { handler(&ingestor, event).await }
    }))
    .await
}
