use thiserror::Error;

/// Errors specific to the WebDriver wire layer.
#[derive(Error, Debug)]
pub enum WebDriverError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Failed to launch driver process: {0}")]
    Launch(String),

    #[error("Session could not be created: {0}")]
    SessionNotCreated(String),

    #[error("Invalid or expired session id: {0}")]
    InvalidSessionId(String),

    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Failed to serialize command: {0}")]
    Serialization(String),

    #[error("Failed to parse driver response: {0}")]
    ResponseParse(String),

    #[error("Driver returned error: code='{code}', message='{message}'")]
    Wire { code: String, message: String },
}

impl WebDriverError {
    /// Maps a W3C error code from the response body onto a variant. Codes
    /// without a dedicated variant stay as `Wire` with code and message
    /// preserved.
    pub fn from_wire(code: &str, message: String) -> Self {
        match code {
            "session not created" => WebDriverError::SessionNotCreated(message),
            "invalid session id" => WebDriverError::InvalidSessionId(message),
            "no such element" => WebDriverError::NoSuchElement(message),
            "stale element reference" => WebDriverError::StaleElement(message),
            "invalid selector" => WebDriverError::InvalidSelector(message),
            "timeout" | "script timeout" => WebDriverError::Timeout(message),
            _ => WebDriverError::Wire {
                code: code.to_string(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for WebDriverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WebDriverError::Timeout(err.to_string())
        } else if err.is_decode() {
            WebDriverError::ResponseParse(err.to_string())
        } else {
            WebDriverError::Http(err.to_string())
        }
    }
}
