// src/utils/key.rs

//! Stable identifier derivation from source URLs.

use crate::models::ItemKey;

/// Non-empty path segments of a URL or slug, ignoring query and fragment.
fn path_segments(raw: &str) -> impl DoubleEndedIterator<Item = &str> {
    let raw = raw.trim();
    let without_query = raw.split(['?', '#']).next().unwrap_or(raw);

    // Drop scheme and host so a bare origin yields no segment
    let path = match without_query.find("://") {
        Some(idx) => {
            let after_scheme = &without_query[idx + 3..];
            after_scheme.find('/').map_or("", |slash| &after_scheme[slash..])
        }
        None => without_query,
    };

    path.split('/').filter(|s| !s.is_empty())
}

/// Last non-empty path segment of a URL or slug, ignoring query and fragment.
///
/// # Examples
/// ```
/// use manga_crawler::utils::key::last_segment;
///
/// assert_eq!(last_segment("https://example.com/manga/12-alpha/"), "12-alpha");
/// assert_eq!(last_segment("alpha"), "alpha");
/// assert_eq!(last_segment("https://example.com/"), "");
/// ```
pub fn last_segment(raw: &str) -> &str {
    path_segments(raw).next_back().unwrap_or("")
}

/// Strip a leading run of ASCII digits and one following hyphen.
fn strip_order_prefix(segment: &str) -> &str {
    let rest = segment.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == segment.len() {
        return segment;
    }
    rest.strip_prefix('-').unwrap_or(rest)
}

/// Derive the stable id for a URL or slug. Empty when the input has no path.
///
/// # Examples
/// ```
/// use manga_crawler::utils::key::derive_id;
///
/// assert_eq!(derive_id("https://example.com/manga/42-my-series/"), "my-series");
/// assert_eq!(derive_id("https://example.com/manga/my-series/"), "my-series");
/// ```
pub fn derive_id(raw: &str) -> String {
    strip_order_prefix(last_segment(raw)).to_string()
}

/// Derive the provider-scoped key for a URL or slug.
pub fn derive_key(provider: &str, raw: &str) -> ItemKey {
    ItemKey::new(provider, derive_id(raw))
}

/// Derive the id of a chapter whose URL nests it under its series,
/// as in `/series/<series>/<chapter>/`.
///
/// The series segment is prefixed unless the chapter slug already starts
/// with it, so chapters of different series never share an id.
///
/// # Examples
/// ```
/// use manga_crawler::utils::key::derive_nested_id;
///
/// assert_eq!(derive_nested_id("https://example.com/series/omega/chapter-1/"), "omega-chapter-1");
/// assert_eq!(derive_nested_id("https://example.com/series/3-omega/omega-chapter-1/"), "omega-chapter-1");
/// ```
pub fn derive_nested_id(raw: &str) -> String {
    let mut segments = path_segments(raw).rev();
    let Some(chapter) = segments.next().map(strip_order_prefix) else {
        return String::new();
    };
    let series = segments
        .next()
        .map(strip_order_prefix)
        .filter(|s| !s.is_empty());

    match series {
        Some(series)
            if !chapter.is_empty() && !chapter.starts_with(&format!("{series}-")) =>
        {
            format!("{series}-{chapter}")
        }
        _ => chapter.to_string(),
    }
}

/// Provider-scoped key for a chapter nested under its series path.
pub fn derive_nested_key(provider: &str, raw: &str) -> ItemKey {
    ItemKey::new(provider, derive_nested_id(raw))
}
