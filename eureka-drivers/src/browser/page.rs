use crate::browser::{behavioral::BehavioralEngine, selector::SelectorChain};
use anyhow::Result;
use fantoccini::{elements::Element, error::CmdError, Client, Locator};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// WebDriver codepoint for the Enter key.
const ENTER_KEY: &str = "\u{E007}";

/// High‑level page wrapper providing selector fallback chains.
pub struct EurekaPage {
    pub(crate) client: Client,
    pub(crate) behavioral_engine: BehavioralEngine,
}

impl EurekaPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client, behavioral_engine: BehavioralEngine) -> Self {
        Self {
            client,
            behavioral_engine,
        }
    }

    /// Navigate to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(anyhow::Error::from)
    }

    /// Return the full page HTML source as currently rendered.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL (after any redirects or form submission).
    pub async fn get_url(&self) -> Result<Url> {
        self.client.current_url().await.map_err(anyhow::Error::from)
    }

    /// Try each selector of `chain` in order and return the first element found,
    /// together with the selector that matched.
    ///
    /// `Ok(None)` means no selector matched; transport failures are errors.
    pub async fn find_first(&self, chain: &SelectorChain) -> Result<Option<(String, EurekaElement)>> {
        for selector in chain.iter() {
            match self.client.find(Locator::Css(selector)).await {
                Ok(element) => {
                    debug!(target: "browser.selector", %selector, "selector matched");
                    return Ok(Some((
                        selector.to_string(),
                        EurekaElement::new(element, &self.behavioral_engine),
                    )));
                }
                Err(e) if is_no_such_element(&e) => {
                    debug!(target: "browser.selector", %selector, "selector missed; trying next");
                }
                Err(e) => return Err(anyhow::Error::from(e)),
            }
        }
        Ok(None)
    }

    /// Wait up to `timeout` for any selector of `chain` to appear.
    ///
    /// Returns the first selector (in chain order) that matches once the wait
    /// succeeds, or `Ok(None)` when nothing appeared in time.
    pub async fn wait_for_any(
        &self,
        chain: &SelectorChain,
        timeout: Duration,
    ) -> Result<Option<String>> {
        if chain.is_empty() {
            return Ok(None);
        }
        let group = chain.as_group();
        let waited = self
            .client
            .wait()
            .at_most(timeout)
            .every(Duration::from_millis(250))
            .for_element(Locator::Css(&group))
            .await;

        match waited {
            Ok(_) => {}
            Err(CmdError::WaitTimeout) => {
                info!(target: "browser.selector", chain = %chain, "timed out waiting for selectors");
                return Ok(None);
            }
            Err(e) if is_no_such_element(&e) => return Ok(None),
            Err(e) => return Err(anyhow::Error::from(e)),
        }

        Ok(self.find_first(chain).await?.map(|(selector, _)| selector))
    }
}

fn is_no_such_element(e: &CmdError) -> bool {
    e.is_no_such_element()
}

// =========================
// EurekaElement Definition
// =========================

#[derive(Clone)]
/// Wrapper for DOM elements that provides typed helpers consistent with [`EurekaPage`].
pub struct EurekaElement {
    pub element: Element,
    pub behavioral_engine: BehavioralEngine,
}

impl EurekaElement {
    /// Construct an element wrapper.
    pub fn new(element: Element, behavioral: &BehavioralEngine) -> Self {
        Self {
            element,
            behavioral_engine: behavioral.clone(),
        }
    }

    /// Clear the field, then type into it using human‑like timings.
    pub async fn type_str(&self, text: &str) -> Result<()> {
        self.element.clear().await?;
        self.behavioral_engine
            .type_text_human_like(&self.element, text)
            .await
    }

    /// Press Enter inside the element (submits the enclosing form).
    pub async fn press_enter(&self) -> Result<()> {
        self.behavioral_engine.random_delay(80, 250).await;
        self.element.send_keys(ENTER_KEY).await?;
        Ok(())
    }

    /// Click the element after a short human‑like pause.
    pub async fn click(&self) -> Result<()> {
        self.behavioral_engine.random_delay(120, 400).await;
        self.element.click().await?;
        Ok(())
    }
}
