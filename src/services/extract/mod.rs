// src/services/extract/mod.rs

//! Per-provider extraction rules.
//!
//! Each supported site theme implements [`Extractor`]. Extraction is a pure
//! function of the parsed page: list pages yield an owned `Vec` of summaries
//! (possibly empty), detail pages yield exactly one record or a parse error.

mod madara;
mod mangastream;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    ChapterDetail, ChapterSummary, ProviderConfig, SeriesDetail, SeriesSummary, Theme,
};
use crate::utils::resolve_url;

pub use madara::MadaraExtractor;
pub use mangastream::MangaStreamExtractor;

/// What the extractor knows about the page besides its markup.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub provider: &'a str,
    pub source_url: &'a str,
    pub scraped_at: DateTime<Utc>,
}

impl<'a> PageContext<'a> {
    pub fn new(provider: &'a str, source_url: &'a str) -> Self {
        Self {
            provider,
            source_url,
            scraped_at: Utc::now(),
        }
    }

    /// Resolve an href found on this page.
    fn absolute(&self, href: &str) -> String {
        match Url::parse(self.source_url) {
            Ok(base) => resolve_url(&base, href.trim()),
            Err(_) => href.trim().to_string(),
        }
    }

    fn missing(&self, what: &str) -> AppError {
        AppError::parse(
            format!("{} {}", self.provider, self.source_url),
            format!("missing {what}"),
        )
    }
}

/// Extraction rules for one site theme.
pub trait Extractor: Send + Sync {
    fn series_list(&self, page: &Html, ctx: &PageContext<'_>) -> Result<Vec<SeriesSummary>>;

    fn series_detail(&self, page: &Html, ctx: &PageContext<'_>) -> Result<SeriesDetail>;

    fn chapter_list(&self, page: &Html, ctx: &PageContext<'_>) -> Result<Vec<ChapterSummary>>;

    fn chapter_detail(&self, page: &Html, ctx: &PageContext<'_>) -> Result<ChapterDetail>;
}

/// Compiled extractors, looked up by provider.
pub struct ExtractorRegistry {
    providers: ProviderConfig,
    mangastream: MangaStreamExtractor,
    madara: MadaraExtractor,
}

impl ExtractorRegistry {
    pub fn new(providers: ProviderConfig) -> Result<Self> {
        Ok(Self {
            providers,
            mangastream: MangaStreamExtractor::new()?,
            madara: MadaraExtractor::new()?,
        })
    }

    /// Extractor for the theme the provider runs.
    pub fn for_provider(&self, provider: &str) -> Result<&dyn Extractor> {
        match self.providers.theme_for(provider) {
            Some(Theme::MangaStream) => Ok(&self.mangastream),
            Some(Theme::Madara) => Ok(&self.madara),
            None => Err(AppError::config(format!(
                "No extraction rules for provider '{provider}'"
            ))),
        }
    }
}

/// Parse page text into a queryable document.
pub fn parse_page(html: &str) -> Html {
    Html::parse_document(html)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Trimmed, non-empty attribute value.
fn attr_of(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Image URL, preferring lazy-load attributes over placeholder `src` values.
fn image_src(el: ElementRef<'_>) -> Option<String> {
    let src = attr_of(el, "src").filter(|s| !s.starts_with("data:"));
    src.or_else(|| attr_of(el, "data-src"))
        .or_else(|| attr_of(el, "data-lazy-src"))
}

/// `<link rel="shortlink">` target, empty if the page has none.
fn short_link(page: &Html, selector: &Selector) -> String {
    first(page.root_element(), selector)
        .and_then(|el| attr_of(el, "href"))
        .unwrap_or_default()
}

/// Absolute URL of a neighbouring chapter, resolved against the page.
///
/// `None` when the href is absent, not http(s), or points back at the page
/// itself (themes render a disabled nav button as `href="#"`).
fn neighbor_url(ctx: &PageContext<'_>, href: Option<&str>) -> Option<String> {
    let href = href.map(str::trim).filter(|h| !h.is_empty())?;
    let resolved = match Url::parse(ctx.source_url) {
        Ok(base) => base.join(href).ok()?,
        Err(_) => Url::parse(href).ok()?,
    };
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }

    let mut page = resolved.clone();
    page.set_fragment(None);
    if page.as_str() == ctx.source_url.trim() {
        return None;
    }
    Some(resolved.to_string())
}

/// First run of digits in `raw`, 0 if none or out of range.
fn leading_number(raw: &str) -> i64 {
    raw.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}
