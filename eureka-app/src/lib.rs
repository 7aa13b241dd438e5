//! HTTP surface of the Eureka search service.
//!
//! - `GET /ping` liveness probe
//! - `GET /eureka_search?q=..&limit=..&date_from=..` search, guarded by
//!   [`auth::Authorizer`]

pub mod auth;
pub mod routes;

use auth::Authorizer;
use eureka_config::EurekaConfig;
use eureka_web::{EurekaSearch, SearchError};

pub use routes::build_router;

/// Immutable per-process state shared by all requests.
pub struct AppState {
    pub search: EurekaSearch,
    pub auth: Authorizer,
}

impl AppState {
    pub fn from_config(cfg: &EurekaConfig) -> Result<Self, SearchError> {
        Ok(Self {
            search: EurekaSearch::from_config(cfg)?,
            auth: Authorizer::from_config(&cfg.auth),
        })
    }
}
