//! Search acquisition and result extraction for the Eureka interpretation index.
//!
//! - [`extract`]: synchronous engine turning a results page into deduplicated,
//!   dated, content-addressed [`extract::ResultRecord`]s
//! - [`acquire`]: page sources (templated HTTP fetch, headless browser)
//! - [`search`]: the query operation tying a page source to the engine

pub mod acquire;
pub mod error;
pub mod extract;
pub mod search;

pub use error::SearchError;
pub use search::{EurekaSearch, SearchRequest, SearchResponse};
