// src/models/series.rs

//! Series records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::{Attribute, Attributes, DetailRecord, ItemKey, SummaryRecord, Table, scrape_date};
use super::RequestType;

/// A series discovered on a listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesSummary {
    /// Provider and series identifier
    pub key: ItemKey,

    /// Display title
    pub title: String,

    /// Absolute URL of the series page
    pub source_url: String,

    /// When the listing was scraped
    pub scraped_at: DateTime<Utc>,
}

impl SummaryRecord for SeriesSummary {
    const TABLE: Table = Table::Series;
    const FOLLOW_UP: RequestType = RequestType::SeriesData;

    fn key(&self) -> &ItemKey {
        &self.key
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("SeriesTitle".to_string(), Attribute::from(self.title.as_str())),
            ("SeriesUrl".to_string(), Attribute::from(self.source_url.as_str())),
            ("ScrapeDate".to_string(), Attribute::S(scrape_date(&self.scraped_at))),
        ])
    }
}

/// Fields scraped from a series page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesDetail {
    pub key: ItemKey,

    /// Cover image URL
    pub cover_url: String,

    /// Canonical short link (`<link rel="shortlink">`), empty if absent
    pub short_url: String,

    /// Synopsis with paragraph breaks encoded as `<br />`
    pub synopsis: String,

    pub scraped_at: DateTime<Utc>,
}

impl DetailRecord for SeriesDetail {
    const TABLE: Table = Table::Series;

    fn key(&self) -> &ItemKey {
        &self.key
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([
            ("SeriesCover".to_string(), Attribute::from(self.cover_url.as_str())),
            ("SeriesShortUrl".to_string(), Attribute::from(self.short_url.as_str())),
            ("SeriesSynopsis".to_string(), Attribute::from(self.synopsis.as_str())),
            ("ScrapeDate".to_string(), Attribute::S(scrape_date(&self.scraped_at))),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_attribute_set_is_fixed() {
        let detail = SeriesDetail {
            key: ItemKey::new("asura", "alpha"),
            cover_url: "https://cdn.example.com/alpha.jpg".to_string(),
            short_url: "https://example.com/?p=12".to_string(),
            synopsis: "One<br />Two".to_string(),
            scraped_at: Utc::now(),
        };
        let names: Vec<_> = detail.attributes().into_keys().collect();
        assert_eq!(
            names,
            vec!["ScrapeDate", "SeriesCover", "SeriesShortUrl", "SeriesSynopsis"]
        );
    }
}
