//! Text canonicalization for description comparison.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Canonical comparison form of `text`.
///
/// Curly quotes become straight quotes, every character that is neither a
/// word character nor whitespace is removed, whitespace runs collapse to a
/// single space, and the result is trimmed and lowercased. Idempotent.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let straightened = text
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"");
    let stripped = NON_WORD_RE.replace_all(&straightened, "");
    WHITESPACE_RE
        .replace_all(&stripped, " ")
        .trim()
        .to_lowercase()
}

/// Resolves an HTML-bearing feed description to its display text.
///
/// Returns the text of the first `<a>` element when one exists, otherwise
/// the trimmed input. Text nodes inside the anchor are trimmed and joined
/// with single spaces.
#[must_use]
pub fn extract_anchor_text(description: &str) -> String {
    if !description.contains('<') {
        return description.trim().to_string();
    }

    let Ok(anchor) = Selector::parse("a") else {
        return description.trim().to_string();
    };

    let fragment = Html::parse_fragment(description);
    match fragment.select(&anchor).next() {
        Some(a) => a
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        None => description.trim().to_string(),
    }
}
