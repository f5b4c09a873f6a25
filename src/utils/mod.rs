//! Utility functions and helpers.

pub mod http;
pub mod key;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/manga/").unwrap();
        assert_eq!(
            resolve_url(&base, "12-alpha/"),
            "https://example.com/manga/12-alpha/"
        );
        assert_eq!(
            resolve_url(&base, "/7-beta/"),
            "https://example.com/7-beta/"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x/"),
            "https://other.com/x/"
        );
    }
}
