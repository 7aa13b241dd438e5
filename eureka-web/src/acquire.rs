//! Page acquisition: get the rendered results page for a query.
//!
//! Two sources share the [`PageSource`] seam:
//! - [`HttpPageSource`] fills the configured URL template and fetches it
//! - [`BrowserPageSource`] types the query into the search form of a real
//!   browser session and snapshots the page once results appear

use crate::error::SearchError;
use eureka_config::{QUERY_PLACEHOLDER, SearchConfig};
use eureka_drivers::browser::driver::{DriverOptions, EurekaDriver};
use eureka_drivers::browser::selector::SelectorChain;
use eureka_http::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use eureka_http::{HttpClient, RequestOpts};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

/// A loaded results page.
#[derive(Debug, Clone)]
pub struct PageCapture {
    /// Final URL of the page; relative links resolve against it.
    pub url: Url,
    pub html: String,
}

#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn acquire(&self, query: &str) -> Result<PageCapture, SearchError>;
}

// ==============================
// HTTP
// ==============================

const PAGE_LANGUAGE: &str = "pl-PL";

/// Fetches `url_template` with `{query}` replaced by the form-encoded query.
pub struct HttpPageSource {
    client: HttpClient,
    template: String,
}

impl HttpPageSource {
    pub fn new(template: &str) -> Result<Self, SearchError> {
        if !template.contains(QUERY_PLACEHOLDER) {
            return Err(SearchError::Template(format!(
                "{template} has no {QUERY_PLACEHOLDER} placeholder"
            )));
        }
        let probe = template.replace(QUERY_PLACEHOLDER, "");
        let client = HttpClient::new(&probe).map_err(|e| SearchError::Template(e.to_string()))?;
        Ok(Self {
            client,
            template: template.to_string(),
        })
    }

    pub fn from_config(cfg: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self::new(&cfg.url_template)?
            .with_timeout(Duration::from_secs(cfg.timeout_secs))
            .with_retries(cfg.retries))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.client = self.client.with_retries(retries);
        self
    }

    /// The URL that will be fetched for `query`.
    pub fn expand(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.template.replace(QUERY_PLACEHOLDER, &encoded)
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageSource {
    async fn acquire(&self, query: &str) -> Result<PageCapture, SearchError> {
        let target = self.expand(query);
        let resp = self
            .client
            .get_text(
                &target,
                RequestOpts {
                    headers: Some(page_headers()),
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;
        debug!(
            target: "acquire.http",
            status = %resp.status,
            final_url = %resp.url,
            body_len = resp.body.len(),
            "acquire.http.done"
        );
        Ok(PageCapture {
            url: resp.url,
            html: resp.body,
        })
    }
}

fn page_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(PAGE_LANGUAGE));
    headers
}

// ==============================
// Browser
// ==============================

/// Drives the site's search form in a WebDriver session.
///
/// Each call opens its own session and closes it before returning; the
/// semaphore bounds how many are open at once.
pub struct BrowserPageSource {
    driver: DriverOptions,
    base_url: Url,
    input: SelectorChain,
    submit: SelectorChain,
    results: SelectorChain,
    timeout: Duration,
    sessions: Arc<Semaphore>,
}

impl BrowserPageSource {
    pub fn from_config(cfg: &SearchConfig) -> Result<Self, SearchError> {
        let base_url = Url::parse(&cfg.base_url)
            .map_err(|e| SearchError::Config(format!("base_url {}: {e}", cfg.base_url)))?;
        let input = SelectorChain::new(cfg.input_selectors.iter().cloned());
        if input.is_empty() {
            return Err(SearchError::Config("input_selectors is empty".into()));
        }
        Ok(Self {
            driver: DriverOptions {
                webdriver_url: cfg.webdriver_url.clone(),
                headless: cfg.headless,
            },
            base_url,
            input,
            submit: SelectorChain::new(cfg.submit_selectors.iter().cloned()),
            results: SelectorChain::new(cfg.result_selectors.iter().cloned()),
            timeout: Duration::from_secs(cfg.timeout_secs),
            sessions: Arc::new(Semaphore::new(cfg.max_sessions.max(1))),
        })
    }

    async fn run(&self, driver: &mut EurekaDriver, query: &str) -> Result<PageCapture, SearchError> {
        let page = driver.goto(self.base_url.as_str()).await?;

        let Some((selector, input)) = page.find_first(&self.input).await? else {
            return Err(SearchError::EntryPointNotFound {
                selectors: self.input.to_string(),
            });
        };
        debug!(target: "acquire.browser", %selector, "search input located");
        input.type_str(query).await?;

        match page.find_first(&self.submit).await? {
            Some((selector, button)) => {
                debug!(target: "acquire.browser", %selector, "submitting via button");
                button.click().await?;
            }
            None => input.press_enter().await?,
        }

        let Some(marker) = page.wait_for_any(&self.results, self.timeout).await? else {
            return Err(SearchError::NoResults {
                timeout_secs: self.timeout.as_secs(),
            });
        };

        let html = page.get_content().await?;
        let url = page.get_url().await?;
        info!(
            target: "acquire.browser",
            %marker,
            final_url = %url,
            body_len = html.len(),
            "acquire.browser.done"
        );
        Ok(PageCapture { url, html })
    }
}

#[async_trait::async_trait]
impl PageSource for BrowserPageSource {
    async fn acquire(&self, query: &str) -> Result<PageCapture, SearchError> {
        let _permit = self
            .sessions
            .acquire()
            .await
            .map_err(|e| SearchError::Driver(e.into()))?;

        let mut driver = EurekaDriver::new(&self.driver).await?;
        let result = self.run(&mut driver, query).await;
        if let Err(e) = driver.close().await {
            warn!(target: "acquire.browser", error = %e, "browser session close failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_requires_placeholder() {
        let err = HttpPageSource::new("https://eureka.mf.gov.pl/szukaj").err().unwrap();
        assert!(matches!(err, SearchError::Template(_)));
    }

    #[test]
    fn query_is_form_encoded() {
        let source = HttpPageSource::new("https://eureka.mf.gov.pl/szukaj?q={query}&page=1").unwrap();
        assert_eq!(
            source.expand("fundacja rodzinna & ulga"),
            "https://eureka.mf.gov.pl/szukaj?q=fundacja+rodzinna+%26+ulga&page=1"
        );
        assert_eq!(
            source.expand("źródło"),
            "https://eureka.mf.gov.pl/szukaj?q=%C5%BAr%C3%B3d%C5%82o&page=1"
        );
    }

    #[test]
    fn browser_source_rejects_bad_config() {
        let mut cfg = SearchConfig::default();
        cfg.base_url = "nie url".into();
        assert!(matches!(
            BrowserPageSource::from_config(&cfg),
            Err(SearchError::Config(_))
        ));

        let mut cfg = SearchConfig::default();
        cfg.input_selectors = vec!["  ".into()];
        assert!(matches!(
            BrowserPageSource::from_config(&cfg),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn browser_source_from_defaults() {
        let source = BrowserPageSource::from_config(&SearchConfig::default()).unwrap();
        assert_eq!(source.base_url.as_str(), "https://eureka.mf.gov.pl/");
        assert_eq!(source.timeout, Duration::from_secs(20));
        assert_eq!(source.sessions.available_permits(), 2);
    }
}
