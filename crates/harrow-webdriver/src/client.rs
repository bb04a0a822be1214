//! The [`WebDriver`] trait and its reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::WebDriverError;
use crate::protocol::{
    Capabilities, CapabilitiesRequest, ElementRef, FindElementsRequest, NavigateRequest,
    NewSessionRequest, NewSessionValue, SessionId, StatusValue, WireError, WireValue,
};

/// Abstract WebDriver backend: everything a session needs from the server.
///
/// One implementation talks HTTP to a real driver; tests substitute mocks.
/// All methods take the calling session's id, since the wire protocol keys
/// every command on it.
#[async_trait]
pub trait WebDriver: Send + Sync + std::fmt::Debug {
    async fn status(&self) -> Result<StatusValue, WebDriverError>;

    async fn new_session(&self, capabilities: &Capabilities) -> Result<SessionId, WebDriverError>;

    async fn delete_session(&self, session: &SessionId) -> Result<(), WebDriverError>;

    async fn navigate(&self, session: &SessionId, url: &str) -> Result<(), WebDriverError>;

    /// All elements matching `selector` in the current page, document order.
    async fn find_elements(
        &self,
        session: &SessionId,
        selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError>;

    /// All elements matching `selector` underneath `element`.
    async fn find_elements_within(
        &self,
        session: &SessionId,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError>;

    /// The element's visible text. An element with no text yields `""`.
    async fn element_text(
        &self,
        session: &SessionId,
        element: &ElementRef,
    ) -> Result<String, WebDriverError>;
}

/// HTTP client for one WebDriver server.
#[derive(Debug, Clone)]
pub struct HttpWebDriver {
    http: reqwest::Client,
    base: Url,
    request_timeout: Duration,
}

impl HttpWebDriver {
    pub fn new(
        endpoint: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, WebDriverError> {
        let base = Url::parse(endpoint)
            .map_err(|e| WebDriverError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(WebDriverError::InvalidEndpoint(format!(
                    "unsupported scheme '{other}' in {endpoint}"
                )));
            }
        }
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(WebDriverError::from)?;
        Ok(Self {
            http,
            base,
            request_timeout,
        })
    }

    /// Polls `GET /status` until the server reports ready. Used after
    /// spawning a local driver process, which takes a moment to bind.
    pub async fn wait_until_ready(
        &self,
        attempts: u32,
        delay: Duration,
    ) -> Result<(), WebDriverError> {
        for attempt in 1..=attempts {
            match self.status().await {
                Ok(status) if status.ready => {
                    log::debug!("Driver ready after {} status poll(s)", attempt);
                    return Ok(());
                }
                Ok(status) => log::trace!("Driver not ready yet: {}", status.message),
                Err(e) => log::trace!("Status poll {}/{} failed: {}", attempt, attempts, e),
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }
        Err(WebDriverError::Timeout(format!(
            "driver did not become ready after {attempts} status polls"
        )))
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, WebDriverError> {
        let url = self.endpoint(path);
        log::trace!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, url.as_str())
            .timeout(self.request_timeout);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(WebDriverError::from)?;
        let status = response.status();
        let payload = response.bytes().await.map_err(WebDriverError::from)?;

        if status.is_success() {
            let wire: WireValue<T> = serde_json::from_slice(&payload)
                .map_err(|e| WebDriverError::ResponseParse(e.to_string()))?;
            Ok(wire.value)
        } else {
            let wire: WireValue<WireError> = serde_json::from_slice(&payload).map_err(|e| {
                WebDriverError::ResponseParse(format!("HTTP {status} with unparseable body: {e}"))
            })?;
            Err(WebDriverError::from_wire(&wire.value.error, wire.value.message))
        }
    }

    fn serialize<B: serde::Serialize>(body: &B) -> Result<Value, WebDriverError> {
        serde_json::to_value(body).map_err(|e| WebDriverError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl WebDriver for HttpWebDriver {
    async fn status(&self) -> Result<StatusValue, WebDriverError> {
        self.execute(Method::GET, "status", None).await
    }

    async fn new_session(&self, capabilities: &Capabilities) -> Result<SessionId, WebDriverError> {
        let body = Self::serialize(&NewSessionRequest {
            capabilities: CapabilitiesRequest {
                always_match: capabilities.clone(),
            },
        })?;
        let value: NewSessionValue = self.execute(Method::POST, "session", Some(body)).await?;
        Ok(SessionId::new(value.session_id))
    }

    async fn delete_session(&self, session: &SessionId) -> Result<(), WebDriverError> {
        let _: Value = self
            .execute(Method::DELETE, &format!("session/{session}"), None)
            .await?;
        Ok(())
    }

    async fn navigate(&self, session: &SessionId, url: &str) -> Result<(), WebDriverError> {
        let body = Self::serialize(&NavigateRequest {
            url: url.to_string(),
        })?;
        let _: Value = self
            .execute(Method::POST, &format!("session/{session}/url"), Some(body))
            .await?;
        Ok(())
    }

    async fn find_elements(
        &self,
        session: &SessionId,
        selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let body = Self::serialize(&FindElementsRequest::css(selector))?;
        self.execute(Method::POST, &format!("session/{session}/elements"), Some(body))
            .await
    }

    async fn find_elements_within(
        &self,
        session: &SessionId,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        let body = Self::serialize(&FindElementsRequest::css(selector))?;
        self.execute(
            Method::POST,
            &format!("session/{session}/element/{}/elements", element.element_id),
            Some(body),
        )
        .await
    }

    async fn element_text(
        &self,
        session: &SessionId,
        element: &ElementRef,
    ) -> Result<String, WebDriverError> {
        self.execute(
            Method::GET,
            &format!("session/{session}/element/{}/text", element.element_id),
            None,
        )
        .await
    }
}
