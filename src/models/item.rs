// src/models/item.rs

//! Store-level item representation shared by every backend.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RequestType;

/// A single stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    /// String value
    S(String),
    /// Integer value
    N(i64),
    /// Ordered list of strings
    L(Vec<String>),
}

impl Attribute {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::S(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::S(value.to_string())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::S(value)
    }
}

/// Non-key attributes of an item, keyed by attribute name.
pub type Attributes = BTreeMap<String, Attribute>;

/// Logical table an item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Series,
    Chapters,
}

impl Table {
    /// Partition key attribute name.
    pub fn provider_attr(self) -> &'static str {
        match self {
            Table::Series => "WebtoonProvider",
            Table::Chapters => "SeriesProvider",
        }
    }

    /// Sort key attribute name.
    pub fn id_attr(self) -> &'static str {
        match self {
            Table::Series => "SeriesId",
            Table::Chapters => "ChapterId",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Series => "series",
            Table::Chapters => "chapters",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-scoped item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub provider: String,
    pub id: String,
}

impl ItemKey {
    pub fn new(provider: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.id)
    }
}

/// A record produced by a list scrape, inserted only when its key is new.
pub trait SummaryRecord {
    /// Table the summary is inserted into.
    const TABLE: Table;

    /// Request type of the follow-up that enriches this record.
    const FOLLOW_UP: RequestType;

    fn key(&self) -> &ItemKey;

    fn source_url(&self) -> &str;

    /// Non-key attributes written on insert.
    fn attributes(&self) -> Attributes;
}

/// A record produced by a detail scrape, merged onto an existing key.
pub trait DetailRecord {
    /// Table the detail is merged into.
    const TABLE: Table;

    fn key(&self) -> &ItemKey;

    /// The fixed attribute set this record overwrites.
    fn attributes(&self) -> Attributes;
}

/// Format a scrape timestamp the way it is stored.
pub fn scrape_date(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
