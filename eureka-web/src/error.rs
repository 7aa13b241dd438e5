use eureka_http::HttpError;
use thiserror::Error;

/// Terminal failures of a search call. All of them come from acquiring the
/// page; the extraction engine itself never fails.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search entry point not found (tried: {selectors})")]
    EntryPointNotFound { selectors: String },
    #[error("no results rendered within {timeout_secs}s")]
    NoResults { timeout_secs: u64 },
    #[error("browser automation failed: {0}")]
    Driver(#[from] anyhow::Error),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("invalid url template: {0}")]
    Template(String),
    #[error("invalid search configuration: {0}")]
    Config(String),
}

impl SearchError {
    /// Whether the failure was the page not producing results in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SearchError::NoResults { .. })
    }
}
