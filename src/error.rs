// src/error.rs

//! Unified error handling for the ingestion pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Page could not be fetched (transport failure or non-success status)
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Required element missing or embedded payload malformed
    #[error("Parse error for {context}: {message}")]
    Parse { context: String, message: String },

    /// Store write failed for a reason other than a duplicate key
    #[error("Store error: {0}")]
    Store(String),

    /// Detail patch targeted a key that does not exist
    #[error("No {table} item for {provider}/{id} to merge into")]
    MergeNotFound {
        table: String,
        provider: String,
        id: String,
    },

    /// Queue submission failed
    #[error("Queue error: {0}")]
    Queue(String),

    /// Inbound request type is not handled
    #[error("Unknown request type '{0}'")]
    UnknownRequest(String),

    /// Inbound message is missing a required attribute
    #[error("Missing message attribute '{0}'")]
    MissingAttribute(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a queue error.
    pub fn queue(message: impl fmt::Display) -> Self {
        Self::Queue(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether running the failed operation again may succeed.
    ///
    /// Transport, store and queue failures are transient. A missing merge
    /// target, an undecodable request or bad configuration fails the same
    /// way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::Parse { .. }
                | Self::Store(_)
                | Self::Queue(_)
                | Self::Http(_)
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_not_found_message() {
        let err = AppError::MergeNotFound {
            table: "series".to_string(),
            provider: "asura".to_string(),
            id: "alpha".to_string(),
        };
        assert_eq!(err.to_string(), "No series item for asura/alpha to merge into");
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(AppError::store("throttled").is_retryable());
        assert!(AppError::queue("batch rejected").is_retryable());
        assert!(AppError::fetch("https://example.com", "timeout").is_retryable());
        assert!(AppError::parse("series detail", "no cover").is_retryable());
    }

    #[test]
    fn test_permanent_errors_are_not_retryable() {
        let missing = AppError::MergeNotFound {
            table: "chapters".to_string(),
            provider: "asura".to_string(),
            id: "alpha-chapter-1".to_string(),
        };
        assert!(!missing.is_retryable());
        assert!(!AppError::UnknownRequest("chapter-update".to_string()).is_retryable());
        assert!(!AppError::config("no theme").is_retryable());
    }
}
