// src/utils/text.rs

//! Text cleanup for scraped fields.

/// Marker that replaces line breaks in free-text fields.
pub const LINE_BREAK: &str = "<br />";

/// Collapse all whitespace, line breaks included, into single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim and turn every run of line breaks into one [`LINE_BREAK`] marker.
///
/// Leading and trailing whitespace on each line is dropped.
pub fn paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  Chapter\n   12 \n"), "Chapter 12");
    }

    #[test]
    fn test_paragraphs_marks_breaks() {
        assert_eq!(
            paragraphs("\n  First line.\nSecond line.  \n"),
            "First line.<br />Second line."
        );
    }

    #[test]
    fn test_paragraphs_collapses_blank_runs() {
        assert_eq!(paragraphs("One\r\n\r\n   \nTwo"), "One<br />Two");
    }

    #[test]
    fn test_paragraphs_empty() {
        assert_eq!(paragraphs(" \n \n"), "");
    }
}
