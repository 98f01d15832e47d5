//! Goodreads link shape check.
//!
//! The model has no reliable knowledge of real Goodreads book IDs, so a
//! `link` on a recommendation is only kept when it looks like a book page.
//! Nothing here touches the network.

use regex::Regex;
use std::sync::LazyLock;

/// `http(s)://[www.]goodreads.com/book/show/<digits>`, anchored at both ends.
static GOODREADS_BOOK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?goodreads\.com/book/show/[0-9]+$")
        .expect("goodreads link pattern is valid")
});

/// Returns `true` only for a Goodreads book URL.
///
/// Absent or empty input returns `false`.
///
/// # Examples
///
/// ```
/// use booklog_recs::link::is_goodreads_link;
///
/// assert!(is_goodreads_link(Some("https://www.goodreads.com/book/show/5470")));
/// assert!(!is_goodreads_link(Some("https://example.com/fake")));
/// assert!(!is_goodreads_link(None));
/// ```
pub fn is_goodreads_link(link: Option<&str>) -> bool {
    match link {
        Some(s) if !s.is_empty() => GOODREADS_BOOK_REGEX.is_match(s),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_with_www() {
        assert!(is_goodreads_link(Some(
            "https://www.goodreads.com/book/show/40961427"
        )));
    }

    #[test]
    fn accepts_http_without_www() {
        assert!(is_goodreads_link(Some("http://goodreads.com/book/show/1")));
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(!is_goodreads_link(Some("https://example.com/fake")));
        assert!(!is_goodreads_link(Some(
            "https://goodreads.com.evil.io/book/show/12"
        )));
    }

    #[test]
    fn rejects_slugged_ids_and_trailing_text() {
        assert!(!is_goodreads_link(Some(
            "https://www.goodreads.com/book/show/5470.1984"
        )));
        assert!(!is_goodreads_link(Some(
            "https://www.goodreads.com/book/show/5470/"
        )));
        assert!(!is_goodreads_link(Some(
            "https://www.goodreads.com/book/show/5470\n"
        )));
    }

    #[test]
    fn rejects_leading_text() {
        assert!(!is_goodreads_link(Some(
            "see https://www.goodreads.com/book/show/5470"
        )));
    }

    #[test]
    fn rejects_missing_id() {
        assert!(!is_goodreads_link(Some("https://www.goodreads.com/book/show/")));
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert!(!is_goodreads_link(Some(
            "https://www.goodreads.com/book/show/١٢٣"
        )));
    }

    #[test]
    fn rejects_empty_and_absent() {
        assert!(!is_goodreads_link(Some("")));
        assert!(!is_goodreads_link(None));
    }
}
