// src/services/extract/madara.rs

//! Madara WordPress theme.

use scraper::{Html, Selector};
use tracing::debug;

use super::{
    Extractor, PageContext, attr_of, first, image_src, neighbor_url, parse_selector, short_link,
    text_of,
};
use crate::error::Result;
use crate::models::{ChapterDetail, ChapterSummary, SeriesDetail, SeriesSummary};
use crate::utils::key::{derive_key, derive_nested_id, derive_nested_key};
use crate::utils::text::{paragraphs, single_line};

pub struct MadaraExtractor {
    series_anchor: Selector,
    cover: Selector,
    synopsis: Selector,
    short_link: Selector,
    chapter_row: Selector,
    anchor: Selector,
    release_date: Selector,
    heading: Selector,
    page_title: Selector,
    page_image: Selector,
    prev: Selector,
    next: Selector,
}

impl MadaraExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            series_anchor: parse_selector("div.page-item-detail div.post-title a")?,
            cover: parse_selector("div.summary_image img")?,
            synopsis: parse_selector("div.summary__content")?,
            short_link: parse_selector("link[rel='shortlink']")?,
            chapter_row: parse_selector("li.wp-manga-chapter")?,
            anchor: parse_selector("a")?,
            release_date: parse_selector("span.chapter-release-date")?,
            heading: parse_selector("h1#chapter-heading")?,
            page_title: parse_selector("title")?,
            page_image: parse_selector("div.reading-content img")?,
            prev: parse_selector("a.prev_page")?,
            next: parse_selector("a.next_page")?,
        })
    }
}

impl Extractor for MadaraExtractor {
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
                title: single_line(&text_of(anchor)),
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

    /// Rows are listed newest first and carry no number, so the ordinal is
    /// the row's position counted from the oldest chapter.
    fn chapter_list(&self, page: &Html, ctx: &PageContext<'_>) -> Result<Vec<ChapterSummary>> {
        let rows: Vec<_> = page.select(&self.chapter_row).collect();
        let total = rows.len();

        let mut chapters = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            let Some((anchor, href)) =
                first(row, &self.anchor).and_then(|a| attr_of(a, "href").map(|h| (a, h)))
            else {
                continue;
            };
            let source_url = ctx.absolute(&href);
            let key = derive_nested_key(ctx.provider, &source_url);
            if key.id.is_empty() {
                debug!(href = %href, "Skipping chapter row without an id");
                continue;
            }

            chapters.push(ChapterSummary {
                key,
                short_title: single_line(&text_of(anchor)),
                published: first(row, &self.release_date)
                    .map(|el| single_line(&text_of(el)))
                    .unwrap_or_default(),
                source_url,
                ordinal: (total - index) as i64,
                scraped_at: ctx.scraped_at,
            });
        }
        Ok(chapters)
    }

    fn chapter_detail(&self, page: &Html, ctx: &PageContext<'_>) -> Result<ChapterDetail> {
        let root = page.root_element();

        let images: Vec<String> = page
            .select(&self.page_image)
            .filter_map(image_src)
            .map(|src| ctx.absolute(&src))
            .collect();
        if images.is_empty() {
            return Err(ctx.missing("chapter images"));
        }

        let title = first(root, &self.heading)
            .or_else(|| first(root, &self.page_title))
            .map(|el| single_line(&text_of(el)))
            .unwrap_or_default();

        let prev_href = first(root, &self.prev).and_then(|a| attr_of(a, "href"));
        let next_href = first(root, &self.next).and_then(|a| attr_of(a, "href"));

        Ok(ChapterDetail {
            key: derive_nested_key(ctx.provider, ctx.source_url),
            title,
            short_url: short_link(page, &self.short_link),
            prev_id: neighbor_url(ctx, prev_href.as_deref())
                .map(|url| derive_nested_id(&url))
                .unwrap_or_default(),
            next_id: neighbor_url(ctx, next_href.as_deref())
                .map(|url| derive_nested_id(&url))
                .unwrap_or_default(),
            images,
            scraped_at: ctx.scraped_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::extract::parse_page;

    const SERIES_LIST: &str = r#"
        <div class="page-item-detail manga">
          <div class="item-summary">
            <div class="post-title font-title"><h3 class="h5">
              <a href="https://reaper.example/series/omega/">Omega
                Knight</a>
            </h3></div>
          </div>
        </div>
        <div class="page-item-detail manga">
          <div class="post-title"><h3><a href="/series/3-sigma/">Sigma</a></h3></div>
        </div>
    "#;

    const CHAPTER_LIST: &str = r#"
        <ul class="main version-chap">
          <li class="wp-manga-chapter">
            <a href="https://reaper.example/series/omega/chapter-3/"> Chapter 3 </a>
            <span class="chapter-release-date"><i>April 2, 2024</i></span>
          </li>
          <li class="wp-manga-chapter">
            <a href="https://reaper.example/series/omega/chapter-2/">Chapter 2</a>
          </li>
          <li class="wp-manga-chapter">
            <a href="https://reaper.example/series/omega/chapter-1/">Chapter 1</a>
          </li>
        </ul>
    "#;

    const CHAPTER_PAGE: &str = r#"
        <html><head><title>Omega Knight - Chapter 2</title></head>
        <body>
          <div class="nav-links">
            <a class="btn prev_page" href="https://reaper.example/series/omega/chapter-1/">Prev</a>
            <a class="btn next_page" href="https://reaper.example/series/omega/chapter-3/">Next</a>
          </div>
          <div class="reading-content">
            <div class="page-break"><img data-src=" https://cdn.reaper.example/1.webp "></div>
            <div class="page-break"><img src="https://cdn.reaper.example/2.webp"></div>
          </div>
        </body></html>
    "#;

    fn ctx(url: &str) -> PageContext<'_> {
        PageContext::new("reaper", url)
    }

    #[test]
    fn test_series_list_resolves_relative_links() {
        let extractor = MadaraExtractor::new().unwrap();
        let page = parse_page(SERIES_LIST);
        let series = extractor
            .series_list(&page, &ctx("https://reaper.example/series/"))
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].key.id, "omega");
        assert_eq!(series[0].title, "Omega Knight");
        assert_eq!(series[1].key.id, "sigma");
        assert_eq!(series[1].source_url, "https://reaper.example/series/3-sigma/");
    }

    #[test]
    fn test_chapter_list_orders_from_oldest() {
        let extractor = MadaraExtractor::new().unwrap();
        let page = parse_page(CHAPTER_LIST);
        let chapters = extractor
            .chapter_list(&page, &ctx("https://reaper.example/series/omega/"))
            .unwrap();

        let ordinals: Vec<_> = chapters.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![3, 2, 1]);
        assert_eq!(chapters[0].key.id, "omega-chapter-3");
        assert_eq!(chapters[0].short_title, "Chapter 3");
        assert_eq!(chapters[0].published, "April 2, 2024");
    }

    #[test]
    fn test_chapter_detail() {
        let extractor = MadaraExtractor::new().unwrap();
        let page = parse_page(CHAPTER_PAGE);
        let detail = extractor
            .chapter_detail(&page, &ctx("https://reaper.example/series/omega/chapter-2/"))
            .unwrap();

        assert_eq!(detail.key.id, "omega-chapter-2");
        assert_eq!(detail.title, "Omega Knight - Chapter 2");
        assert_eq!(detail.prev_id, "omega-chapter-1");
        assert_eq!(detail.next_id, "omega-chapter-3");
        assert_eq!(
            detail.images,
            vec![
                "https://cdn.reaper.example/1.webp".to_string(),
                "https://cdn.reaper.example/2.webp".to_string()
            ]
        );
        assert_eq!(detail.short_url, "");
    }

    #[test]
    fn test_chapter_ids_are_scoped_by_series() {
        let extractor = MadaraExtractor::new().unwrap();
        let row = |series: &str| {
            format!(
                r#"<li class="wp-manga-chapter"><a href="https://reaper.example/series/{series}/chapter-1/">Chapter 1</a></li>"#
            )
        };
        let omega_page = parse_page(&row("omega"));
        let sigma_page = parse_page(&row("7-sigma"));

        let omega = extractor
            .chapter_list(&omega_page, &ctx("https://reaper.example/series/omega/"))
            .unwrap();
        let sigma = extractor
            .chapter_list(&sigma_page, &ctx("https://reaper.example/series/7-sigma/"))
            .unwrap();

        assert_eq!(omega[0].key.id, "omega-chapter-1");
        assert_eq!(sigma[0].key.id, "sigma-chapter-1");
    }

    #[test]
    fn test_chapter_detail_resolves_relative_nav_links() {
        let extractor = MadaraExtractor::new().unwrap();
        let page = parse_page(
            r#"<a class="prev_page" href="/series/omega/chapter-1/">Prev</a>
               <a class="next_page" href="../chapter-3/">Next</a>
               <div class="reading-content"><img src="/1.webp"></div>"#,
        );
        let detail = extractor
            .chapter_detail(&page, &ctx("https://reaper.example/series/omega/chapter-2/"))
            .unwrap();

        assert_eq!(detail.prev_id, "omega-chapter-1");
        assert_eq!(detail.next_id, "omega-chapter-3");
        assert_eq!(detail.images, vec!["https://reaper.example/1.webp".to_string()]);
    }

    #[test]
    fn test_disabled_nav_link_gives_empty_id() {
        let extractor = MadaraExtractor::new().unwrap();
        let page = parse_page(
            r##"<a class="prev_page" href="#">Prev</a>
               <div class="reading-content"><img src="/1.webp"></div>"##,
        );
        let detail = extractor
            .chapter_detail(&page, &ctx("https://reaper.example/series/omega/chapter-1/"))
            .unwrap();
        assert_eq!(detail.prev_id, "");
    }

    #[test]
    fn test_chapter_detail_without_images_is_parse_error() {
        let extractor = MadaraExtractor::new().unwrap();
        let page = parse_page("<html><body><div class='reading-content'></div></body></html>");
        let err = extractor
            .chapter_detail(&page, &ctx("https://reaper.example/series/omega/chapter-2/"))
            .unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_series_detail_requires_cover() {
        let extractor = MadaraExtractor::new().unwrap();
        let page = parse_page("<div class='summary__content'>Text</div>");
        assert!(
            extractor
                .series_detail(&page, &ctx("https://reaper.example/series/omega/"))
                .is_err()
        );
    }
}
