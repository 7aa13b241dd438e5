//! Result extraction engine.
//!
//! Control flow per page: every anchor in document order goes through the
//! [`candidate`] filter, accepted ones get a [`context`] block, the
//! [`record`] builder normalizes them (dates via [`date`]) and the
//! [`limiter`] keeps the first `limit` distinct URLs. Callers then apply the
//! [`filter`] date floor. Everything here is pure and synchronous.

pub mod candidate;
pub mod context;
pub mod date;
pub mod filter;
pub mod limiter;
pub mod pipeline;
pub mod record;

pub use candidate::{CandidateFilter, LinkRule};
pub use context::extract_context;
pub use date::{CanonicalDate, normalize};
pub use filter::{apply_date_floor, parse_floor};
pub use limiter::{Limiter, Offer, fold};
pub use pipeline::{ExtractOptions, extract, extract_html};
pub use record::{DEFAULT_TITLE, ResultRecord, SNIPPET_MAX_CHARS, build};

/// Collapse runs of whitespace into single spaces and trim both ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of `el` with its text nodes space-separated, then collapsed, so
/// adjacent cells or lines never glue into one token.
pub(crate) fn element_text(el: scraper::ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}
