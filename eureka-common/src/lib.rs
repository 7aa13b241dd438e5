//! Common types and utilities shared across Eureka crates.
//!
//! This crate holds the pieces every other crate needs without pulling in
//! browser or HTTP machinery: logging initialisation, the enums describing how
//! a search page is acquired, and the bootstrap error type.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`AcquisitionMode`]: how result pages are fetched
//! - [`EurekaError`] and [`Result`]: configuration and bootstrap failures
//!
//! # Examples
//!
//! ```rust
//! use eureka_common::AcquisitionMode;
//!
//! assert_eq!(AcquisitionMode::default(), AcquisitionMode::Http);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// How a search results page is obtained for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionMode {
    /// Fetch a templated results URL and parse the returned markup.
    #[default]
    Http,
    /// Drive a WebDriver session through the search form.
    Browser,
}

/// Error types raised while bootstrapping the service.
#[derive(thiserror::Error, Debug)]
pub enum EurekaError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be initialised.
    #[error("Observability error: {0}")]
    Observability(#[from] anyhow::Error),

    /// The listener could not be bound or the server stopped unexpectedly.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Convenient alias for results that use [`EurekaError`].
pub type Result<T> = std::result::Result<T, EurekaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct ModeField {
        mode: AcquisitionMode,
    }

    #[test]
    fn mode_deserializes_lowercase() {
        let p: ModeField = serde_json::from_str(r#"{"mode":"browser"}"#).unwrap();
        assert_eq!(p.mode, AcquisitionMode::Browser);
    }

    #[test]
    fn config_error_renders_message() {
        let err = EurekaError::Config("missing {query}".into());
        assert_eq!(err.to_string(), "Configuration error: missing {query}");
    }
}
