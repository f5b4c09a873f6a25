// src/models/request.rs

//! Inbound and follow-up request descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Message attribute carrying the request type.
pub const ATTR_REQUEST_TYPE: &str = "RequestType";
/// Message attribute carrying the provider identifier.
pub const ATTR_PROVIDER: &str = "Provider";
/// Message attribute carrying the URL to fetch.
pub const ATTR_SOURCE_URL: &str = "SourceUrl";

/// Kind of ingestion a message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestType {
    SeriesList,
    SeriesData,
    ChapterList,
    ChapterData,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::SeriesList => "series-list",
            RequestType::SeriesData => "series-data",
            RequestType::ChapterList => "chapter-list",
            RequestType::ChapterData => "chapter-data",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "series-list" => Ok(RequestType::SeriesList),
            "series-data" => Ok(RequestType::SeriesData),
            "chapter-list" => Ok(RequestType::ChapterList),
            "chapter-data" => Ok(RequestType::ChapterData),
            other => Err(AppError::UnknownRequest(other.to_string())),
        }
    }
}

/// A decoded ingestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub request_type: RequestType,
    pub provider: String,
    pub source_url: String,
}

impl IngestRequest {
    pub fn new(
        request_type: RequestType,
        provider: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            request_type,
            provider: provider.into(),
            source_url: source_url.into(),
        }
    }

    /// Build a request from message attributes looked up by name.
    pub fn from_attributes<'a, F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let get = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::MissingAttribute(name.to_string()))
        };

        Ok(Self {
            request_type: get(ATTR_REQUEST_TYPE)?.parse()?,
            provider: get(ATTR_PROVIDER)?.to_string(),
            source_url: get(ATTR_SOURCE_URL)?.to_string(),
        })
    }
}
