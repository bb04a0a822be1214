//! # Harrow Core
//!
//! Shared foundation for the harrow extractor: the configuration model and
//! loader, the logging setup helper, and the core error type. Nothing in
//! this crate talks to a browser; the wire layer lives in
//! `harrow-webdriver` and the extraction logic in `harrow-client`.

pub mod config;
pub mod error;
pub mod logging;

pub use crate::config::{
    Config, ExtractorConfig, FieldRule, FieldStrategy, GlobalConfig, WebDriverConfig,
};
pub use crate::error::CoreError;
