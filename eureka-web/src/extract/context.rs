use super::element_text;
use scraper::ElementRef;

const BLOCK_TAGS: &[&str] = &["div", "article", "section", "p", "td", "tr"];

fn is_root_tag(tag: &str) -> bool {
    tag == "a" || tag == "li" || BLOCK_TAGS.contains(&tag)
}

/// The element whose text describes `anchor`: its closest link, block or
/// list-item ancestor.
pub fn context_root(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| is_root_tag(el.value().name()))
}

/// Whitespace-collapsed text surrounding `anchor`.
///
/// Falls back to the anchor's own text when no context root exists or the
/// root has no text; never fails.
pub fn extract_context(anchor: ElementRef<'_>) -> String {
    let from_root = context_root(anchor)
        .map(element_text)
        .filter(|text| !text.is_empty());
    match from_root {
        Some(text) => text,
        None => element_text(anchor),
    }
}
