//! Extractor-level errors.

use harrow_core::error::CoreError;
use harrow_webdriver::WebDriverError;
use thiserror::Error;

/// Failures surfaced by the extractor. Each browser-facing step maps the
/// underlying wire error into the kind naming the step that failed; the
/// session is still released whenever it had been opened.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The browser session could not be acquired (driver missing, endpoint
    /// unreachable, or session creation rejected).
    #[error("failed to start browser session: {0}")]
    SessionStart(#[source] WebDriverError),

    /// The page did not load (network failure, invalid URL, timeout).
    #[error("navigation to '{url}' failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: WebDriverError,
    },

    /// The row selector matched nothing and at least one row was required.
    #[error("no elements matched selector '{selector}'")]
    ElementNotFound { selector: String },

    /// Element location or text retrieval failed on an open page.
    #[error("failed to extract from a located element: {0}")]
    Extraction(#[source] WebDriverError),

    /// The session could not be released cleanly.
    #[error("failed to release browser session: {0}")]
    Close(#[source] WebDriverError),

    #[error(transparent)]
    Config(#[from] CoreError),
}
