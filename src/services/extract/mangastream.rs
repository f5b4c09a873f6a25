// src/services/extract/mangastream.rs

//! MangaStream (Themesia) WordPress theme.
//!
//! Series index: `div.soralist a.series`. Chapter list: `div.eplister a`
//! inside `li[data-num]`. Reader pages embed a `ts_reader.run({...})` call
//! carrying neighbour URLs and the page images.

use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    Extractor, PageContext, attr_of, first, image_src, leading_number, neighbor_url,
    parse_selector, short_link, text_of,
};
use crate::error::{AppError, Result};
use crate::models::{ChapterDetail, ChapterSummary, SeriesDetail, SeriesSummary};
use crate::utils::key::{derive_id, derive_key};
use crate::utils::text::{paragraphs, single_line};

/// Payload passed to `ts_reader.run`.
#[derive(Debug, Deserialize)]
struct ReaderScript {
    #[serde(default, rename = "prevUrl", alias = "previousUrl")]
    prev_url: Value,

    #[serde(default, rename = "nextUrl")]
    next_url: Value,

    #[serde(default)]
    sources: Vec<ReaderSource>,
}

#[derive(Debug, Deserialize)]
struct ReaderSource {
    #[serde(default)]
    images: Vec<String>,
}

pub struct MangaStreamExtractor {
    series_anchor: Selector,
    cover: Selector,
    synopsis: Selector,
    short_link: Selector,
    chapter_anchor: Selector,
    chapter_num: Selector,
    chapter_date: Selector,
    title: Selector,
    script: Selector,
    reader_call: Regex,
}

impl MangaStreamExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            series_anchor: parse_selector("div.soralist a.series")?,
            cover: parse_selector("div.thumb img")?,
            synopsis: parse_selector("div.entry-content")?,
            short_link: parse_selector("link[rel='shortlink']")?,
            chapter_anchor: parse_selector("div.eplister a")?,
            chapter_num: parse_selector("span.chapternum")?,
            chapter_date: parse_selector("span.chapterdate")?,
            title: parse_selector("h1.entry-title")?,
            script: parse_selector("script")?,
            reader_call: Regex::new(r"(?s)ts_reader\.run\((\{.*\})\)")
                .map_err(|e| AppError::config(e.to_string()))?,
        })
    }

    fn reader_script(&self, page: &Html, ctx: &PageContext<'_>) -> Result<ReaderScript> {
        let payload = page
            .select(&self.script)
            .map(text_of)
            .find_map(|text| {
                self.reader_call
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            })
            .ok_or_else(|| ctx.missing("ts_reader script"))?;

        serde_json::from_str(&payload).map_err(|e| {
            AppError::parse(
                format!("{} {}", ctx.provider, ctx.source_url),
                format!("malformed ts_reader payload: {e}"),
            )
        })
    }
}

impl Extractor for MangaStreamExtractor {
    fn series_list(&self, page: &Html, ctx: &PageContext<'_>) -> Result<Vec<SeriesSummary>> {
        let mut series = Vec::new();
        for anchor in page.select(&self.series_anchor) {
            let Some(href) = attr_of(anchor, "href") else {
                continue;
            };
            let source_url = ctx.absolute(&href);
            let key = derive_key(ctx.provider, &source_url);
            if key.id.is_empty() {
                debug!(href = %href, "Skipping series anchor without an id");
                continue;
            }

            series.push(SeriesSummary {
                key,
                title: text_of(anchor).trim().to_string(),
                source_url,
                scraped_at: ctx.scraped_at,
            });
        }
        Ok(series)
    }

    fn series_detail(&self, page: &Html, ctx: &PageContext<'_>) -> Result<SeriesDetail> {
        let root = page.root_element();
        let cover_url = first(root, &self.cover)
            .and_then(image_src)
            .ok_or_else(|| ctx.missing("cover image"))?;
        let synopsis = first(root, &self.synopsis)
            .map(|el| paragraphs(&text_of(el)))
            .unwrap_or_default();

        Ok(SeriesDetail {
            key: derive_key(ctx.provider, ctx.source_url),
            cover_url: ctx.absolute(&cover_url),
            short_url: short_link(page, &self.short_link),
            synopsis,
            scraped_at: ctx.scraped_at,
        })
    }

    fn chapter_list(&self, page: &Html, ctx: &PageContext<'_>) -> Result<Vec<ChapterSummary>> {
        let mut chapters = Vec::new();
        for anchor in page.select(&self.chapter_anchor) {
            let Some(href) = attr_of(anchor, "href") else {
                continue;
            };
            let source_url = ctx.absolute(&href);
            let key = derive_key(ctx.provider, &source_url);
            if key.id.is_empty() {
                debug!(href = %href, "Skipping chapter anchor without an id");
                continue;
            }

            let ordinal = anchor
                .ancestors()
                .filter_map(scraper::ElementRef::wrap)
                .find(|el| el.value().name() == "li")
                .and_then(|li| li.value().attr("data-num"))
                .map_or(0, leading_number);

            chapters.push(ChapterSummary {
                key,
                short_title: first(anchor, &self.chapter_num)
                    .map(|el| single_line(&text_of(el)))
                    .unwrap_or_default(),
                published: first(anchor, &self.chapter_date)
                    .map(|el| text_of(el).trim().to_string())
                    .unwrap_or_default(),
                source_url,
                ordinal,
                scraped_at: ctx.scraped_at,
            });
        }
        Ok(chapters)
    }

    fn chapter_detail(&self, page: &Html, ctx: &PageContext<'_>) -> Result<ChapterDetail> {
        let title = first(page.root_element(), &self.title)
            .map(|el| text_of(el).trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ctx.missing("chapter title"))?;

        let script = self.reader_script(page, ctx)?;
        let images: Vec<String> = script
            .sources
            .into_iter()
            .next()
            .map(|source| source.images)
            .unwrap_or_default()
            .into_iter()
            .map(|img| img.trim().to_string())
            .filter(|img| !img.is_empty())
            .collect();
        if images.is_empty() {
            return Err(ctx.missing("chapter images"));
        }

        Ok(ChapterDetail {
            key: derive_key(ctx.provider, ctx.source_url),
            title,
            short_url: short_link(page, &self.short_link),
            prev_id: neighbor_url(ctx, script.prev_url.as_str())
                .map(|url| derive_id(&url))
                .unwrap_or_default(),
            next_id: neighbor_url(ctx, script.next_url.as_str())
                .map(|url| derive_id(&url))
                .unwrap_or_default(),
            images,
            scraped_at: ctx.scraped_at,
        })
    }
}
