use super::{collapse_whitespace, element_text};
use super::date::{CanonicalDate, normalize};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use url::Url;

/// Title used when the anchor has no visible text.
pub const DEFAULT_TITLE: &str = "(bez tytułu)";
pub const SNIPPET_MAX_CHARS: usize = 240;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub title: String,
    /// Absolute URL.
    pub url: String,
    pub date: Option<CanonicalDate>,
    pub snippet: Option<String>,
    /// Hex of the first 128 bits of `blake3(url || date)`.
    pub id: String,
}

impl ResultRecord {
    /// Assemble a record from already-extracted parts. `None` when `href` is
    /// missing or blank, or cannot be made absolute.
    pub fn from_parts(
        href: Option<&str>,
        anchor_text: &str,
        context_text: &str,
        base_url: Option<&Url>,
    ) -> Option<Self> {
        let url = resolve_href(href?, base_url)?;

        let title = collapse_whitespace(anchor_text);
        let title = if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        };

        let context = collapse_whitespace(context_text);
        let date = normalize(&context);
        let snippet = if context.is_empty() {
            None
        } else {
            Some(context.chars().take(SNIPPET_MAX_CHARS).collect())
        };

        let id = record_id(&url, date.as_ref());
        Some(Self {
            title,
            url,
            date,
            snippet,
            id,
        })
    }
}

/// Build a record for `anchor` with the given surrounding text.
pub fn build(anchor: ElementRef<'_>, context_text: &str, base_url: Option<&Url>) -> Option<ResultRecord> {
    let text = element_text(anchor);
    ResultRecord::from_parts(anchor.value().attr("href"), &text, context_text, base_url)
}

/// Content address of a record. Depends only on `url` and `date`.
pub fn record_id(url: &str, date: Option<&CanonicalDate>) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(url.as_bytes());
    if let Some(date) = date {
        hasher.update(date.to_string().as_bytes());
    }
    hex::encode(&hasher.finalize().as_bytes()[..16])
}

/// Absolute form of `href`: kept verbatim when already absolute, else joined
/// onto `base_url`.
pub(crate) fn resolve_href(href: &str, base_url: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }
    base_url?.join(href).ok().map(String::from)
}
