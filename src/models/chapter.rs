// src/models/chapter.rs

//! Chapter records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::{Attribute, Attributes, DetailRecord, ItemKey, SummaryRecord, Table, scrape_date};
use super::RequestType;

/// A chapter discovered on a series' chapter list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterSummary {
    /// Provider and chapter identifier
    pub key: ItemKey,

    /// Short title, e.g. "Chapter 12"
    pub short_title: String,

    /// Publish date as shown by the provider
    pub published: String,

    /// Absolute URL of the chapter page
    pub source_url: String,

    /// Provider ordering number (0 when the provider gives none)
    pub ordinal: i64,

    pub scraped_at: DateTime<Utc>,
}

impl SummaryRecord for ChapterSummary {
    const TABLE: Table = Table::Chapters;
    const FOLLOW_UP: RequestType = RequestType::ChapterData;

    fn key(&self) -> &ItemKey {
        &self.key
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("ChapterShortTitle".to_string(), Attribute::from(self.short_title.as_str())),
            ("ChapterDate".to_string(), Attribute::from(self.published.as_str())),
            ("ChapterUrl".to_string(), Attribute::from(self.source_url.as_str())),
            ("ChapterOrder".to_string(), Attribute::N(self.ordinal)),
            ("ScrapeDate".to_string(), Attribute::S(scrape_date(&self.scraped_at))),
        ])
    }
}

/// Fields scraped from a chapter reader page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterDetail {
    pub key: ItemKey,

    /// Full chapter title
    pub title: String,

    /// Canonical short link, empty if absent
    pub short_url: String,

    /// Identifier of the previous chapter, empty if none
    pub prev_id: String,

    /// Identifier of the next chapter, empty if none
    pub next_id: String,

    /// Page images in reading order
    pub images: Vec<String>,

    pub scraped_at: DateTime<Utc>,
}

impl DetailRecord for ChapterDetail {
    const TABLE: Table = Table::Chapters;

    fn key(&self) -> &ItemKey {
        &self.key
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("ChapterTitle".to_string(), Attribute::from(self.title.as_str())),
            ("ChapterShortUrl".to_string(), Attribute::from(self.short_url.as_str())),
            ("ChapterPrev".to_string(), Attribute::from(self.prev_id.as_str())),
            ("ChapterNext".to_string(), Attribute::from(self.next_id.as_str())),
            ("ChapterContent".to_string(), Attribute::L(self.images.clone())),
            ("ScrapeDate".to_string(), Attribute::S(scrape_date(&self.scraped_at))),
        ])
    }
}
