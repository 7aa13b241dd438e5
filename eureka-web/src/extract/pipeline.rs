use super::candidate::CandidateFilter;
use super::context::extract_context;
use super::limiter::{Limiter, Offer};
use super::record::{ResultRecord, build};
use eureka_config::ExtractConfig;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));
static BASE_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("base selector is valid"));

/// Tuning for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub candidates: CandidateFilter,
    /// Anchors scanned per page, candidates or not.
    pub max_anchors: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            candidates: CandidateFilter::default(),
            max_anchors: 1000,
        }
    }
}

impl From<&ExtractConfig> for ExtractOptions {
    fn from(cfg: &ExtractConfig) -> Self {
        Self {
            candidates: CandidateFilter::new(&cfg.path_marker, &cfg.keyword),
            max_anchors: cfg.max_anchors,
        }
    }
}

/// Extract up to `limit` distinct result records from a parsed page, in
/// document order.
///
/// Relative links resolve against the page's `<base href>` when it has one,
/// else against `base_url`. Anchors that cannot become a record are skipped.
pub fn extract(
    document: &Html,
    base_url: Option<&Url>,
    limit: usize,
    opts: &ExtractOptions,
) -> Vec<ResultRecord> {
    let base = document_base(document, base_url);
    let mut limiter = Limiter::new(limit);
    let (mut scanned, mut candidates, mut skipped, mut duplicates) = (0usize, 0usize, 0usize, 0usize);

    for anchor in document.select(&ANCHORS).take(opts.max_anchors) {
        if limiter.is_full() {
            break;
        }
        scanned += 1;
        if !opts.candidates.is_candidate(anchor, base.as_ref()) {
            continue;
        }
        candidates += 1;

        let context = extract_context(anchor);
        let Some(record) = build(anchor, &context, base.as_ref()) else {
            skipped += 1;
            continue;
        };
        if limiter.offer(record) == Offer::Duplicate {
            duplicates += 1;
        }
    }

    debug!(
        target: "extract",
        scanned,
        candidates,
        skipped,
        duplicates,
        accepted = limiter.len(),
        limit,
        "extract.done"
    );
    limiter.into_records()
}

/// Parse `html` and run [`extract`] over it.
pub fn extract_html(
    html: &str,
    base_url: Option<&Url>,
    limit: usize,
    opts: &ExtractOptions,
) -> Vec<ResultRecord> {
    let document = Html::parse_document(html);
    extract(&document, base_url, limit, opts)
}

fn document_base(document: &Html, base_url: Option<&Url>) -> Option<Url> {
    let declared = document
        .select(&BASE_HREF)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| match base_url {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        });
    declared.or_else(|| base_url.cloned())
}
