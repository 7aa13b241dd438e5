use crate::browser::{behavioral::BehavioralEngine, page::EurekaPage};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;
use webdriver::capabilities::Capabilities;

const WINDOW_SIZE: (u32, u32) = (1366, 768);
const BROWSER_LANG: &str = "pl-PL";

/// Where and how to open a WebDriver session.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// WebDriver endpoint, e.g. `http://localhost:9515` for Chromedriver.
    pub webdriver_url: String,
    pub headless: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
        }
    }
}

/// Chrome command-line arguments for a session opened with `opts`.
pub fn chrome_arguments(opts: &DriverOptions) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        format!("--window-size={},{}", WINDOW_SIZE.0, WINDOW_SIZE.1),
        format!("--lang={BROWSER_LANG}"),
    ];
    if opts.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct EurekaDriver {
    pub client: Client,
    pub behavioral_engine: BehavioralEngine,
}

impl EurekaDriver {
    /// Create a new driver connected to the WebDriver service named in `opts`.
    pub async fn new(opts: &DriverOptions) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(chrome_arguments(opts)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        debug!(
            target: "browser.driver",
            webdriver_url = %opts.webdriver_url,
            headless = opts.headless,
            "browser.session.connect"
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&opts.webdriver_url)
            .await
            .with_context(|| format!("failed to connect to WebDriver at {}", opts.webdriver_url))?;

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
        })
    }

    /// Navigate to `url` and return a [`EurekaPage`] for it.
    pub async fn goto(&mut self, url: &str) -> Result<EurekaPage> {
        let page = EurekaPage::new(self.client.clone(), self.behavioral_engine.clone());
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_adds_headless_flags() {
        let args = chrome_arguments(&DriverOptions::default());
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--lang=pl-PL".to_string()));

        let args = chrome_arguments(&DriverOptions {
            headless: false,
            ..Default::default()
        });
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(args.contains(&"--window-size=1366,768".to_string()));
    }

    #[test]
    fn no_automation_masking_flags() {
        let args = chrome_arguments(&DriverOptions::default());
        assert!(!args.iter().any(|a| a.contains("AutomationControlled")));
        assert!(!args.iter().any(|a| a.starts_with("--user-agent")));
    }
}
