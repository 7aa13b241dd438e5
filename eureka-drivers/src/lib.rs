//! Driver layer for browser automation.
//!
//! This crate exposes the browser driver and page/element helpers used to
//! drive a search form the way a person would.
//!
//! - [`browser::driver::EurekaDriver`]: WebDriver client wrapper
//! - [`browser::page::EurekaPage`]: DOM helpers and selector fallback chains
//! - [`browser::selector::SelectorChain`]: ordered CSS selectors, first match wins
//! - [`browser::behavioral::BehavioralEngine`]: paced typing and clicks
pub mod browser;
