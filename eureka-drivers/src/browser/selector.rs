use serde::{Deserialize, Serialize};

/// Ordered list of CSS selectors tried in priority order; the first one that
/// matches wins.
///
/// Search pages change markup more often than they change behavior, so each
/// affordance (search field, submit button, result marker) is described by a
/// chain rather than a single selector.
///
/// ```
/// use eureka_drivers::browser::selector::SelectorChain;
///
/// let chain = SelectorChain::new(["input[type='search']", "  ", "input[name='q']"]);
/// assert_eq!(chain.len(), 2);
/// assert_eq!(chain.to_string(), "input[type='search'] | input[name='q']");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorChain(Vec<String>);

impl SelectorChain {
    /// Build a chain, dropping blank entries.
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            selectors
                .into_iter()
                .map(Into::into)
                .map(|s: String| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All selectors joined into one CSS selector group (`a, b, c`), handy
    /// when waiting for "any of" rather than "first of".
    pub fn as_group(&self) -> String {
        self.0.join(", ")
    }
}

impl std::fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" | "))
    }
}

impl From<Vec<String>> for SelectorChain {
    fn from(v: Vec<String>) -> Self {
        Self::new(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_priority_order() {
        let chain = SelectorChain::from(vec!["b".to_string(), "a".to_string()]);
        assert_eq!(chain.iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(chain.as_group(), "b, a");
    }

    #[test]
    fn empty_chain() {
        let chain = SelectorChain::new(Vec::<String>::new());
        assert!(chain.is_empty());
        assert_eq!(chain.as_group(), "");
    }
}
