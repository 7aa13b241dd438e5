use super::record::resolve_href;
use scraper::ElementRef;
use url::Url;

/// One way of recognizing a result-detail link from its href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRule {
    /// Literal path fragment, matched case-sensitively.
    PathMarker(String),
    /// Case-insensitive keyword anywhere in the href. Stored lowercased.
    Keyword(String),
}

impl LinkRule {
    pub fn keyword(keyword: &str) -> Self {
        LinkRule::Keyword(keyword.to_lowercase())
    }

    pub fn matches(&self, href: &str) -> bool {
        match self {
            LinkRule::PathMarker(marker) => href.contains(marker.as_str()),
            LinkRule::Keyword(keyword) => href.to_lowercase().contains(keyword.as_str()),
        }
    }
}

/// Ordered link rules; the first rule that matches accepts the anchor.
///
/// Emptiness of the href or text is not judged here, see
/// [`build`](super::record::build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    rules: Vec<LinkRule>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::new("/informacje/podglad/", "interpretac")
    }
}

impl CandidateFilter {
    /// Path marker first, keyword as fallback. Blank values are skipped.
    pub fn new(path_marker: &str, keyword: &str) -> Self {
        let mut rules = Vec::with_capacity(2);
        if !path_marker.trim().is_empty() {
            rules.push(LinkRule::PathMarker(path_marker.trim().to_string()));
        }
        if !keyword.trim().is_empty() {
            rules.push(LinkRule::keyword(keyword.trim()));
        }
        Self { rules }
    }

    pub fn from_rules(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LinkRule] {
        &self.rules
    }

    /// The first rule accepting `href`, if any.
    pub fn matching_rule(&self, href: &str) -> Option<&LinkRule> {
        self.rules.iter().find(|rule| rule.matches(href))
    }

    pub fn accepts_href(&self, href: &str) -> bool {
        self.matching_rule(href).is_some()
    }

    /// Whether the anchor looks like a result link, judged on its raw `href`
    /// first and then on the href resolved against `base_url`.
    pub fn is_candidate(&self, anchor: ElementRef<'_>, base_url: Option<&Url>) -> bool {
        let Some(href) = anchor.value().attr("href") else {
            return false;
        };
        self.accepts_href(href)
            || resolve_href(href, base_url).is_some_and(|url| self.accepts_href(&url))
    }
}
