//! Typed request and response bodies for the W3C WebDriver wire protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON key under which the protocol returns element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// The only locator strategy this client uses.
pub const CSS_SELECTOR: &str = "css selector";

/// Identifier of one session on the driver. Opaque; appears in request
/// paths, never in bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub struct NewSessionRequest {
    pub capabilities: CapabilitiesRequest,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesRequest {
    #[serde(rename = "alwaysMatch")]
    pub always_match: Capabilities,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Capabilities {
    #[serde(rename = "browserName", skip_serializing_if = "Option::is_none")]
    pub browser_name: Option<String>,

    #[serde(rename = "goog:chromeOptions", skip_serializing_if = "Option::is_none")]
    pub chrome_options: Option<ChromeOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<Timeouts>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChromeOptions {
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeouts {
    pub page_load: u64,
    pub script: u64,
    pub implicit: u64,
}

#[derive(Debug, Serialize)]
pub struct NavigateRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FindElementsRequest {
    pub using: String,
    pub value: String,
}

impl FindElementsRequest {
    pub fn css(selector: &str) -> Self {
        Self {
            using: CSS_SELECTOR.to_string(),
            value: selector.to_string(),
        }
    }
}

/// Every response body is `{"value": ...}`.
#[derive(Debug, Deserialize)]
pub struct WireValue<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub struct NewSessionValue {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Reference to one located element within a page. Valid only while the
/// session remains open and the page has not navigated away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub element_id: String,
}

/// Error body returned by the driver on non-success responses.
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusValue {
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}
