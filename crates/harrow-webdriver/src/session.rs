//! Session startup and the owned [`Session`] handle.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use harrow_core::config::WebDriverConfig;

use crate::client::{HttpWebDriver, WebDriver};
use crate::error::WebDriverError;
use crate::launcher::{DriverLauncher, READY_POLL_ATTEMPTS, READY_POLL_DELAY};
use crate::protocol::{Capabilities, ChromeOptions, ElementRef, SessionId, Timeouts};

/// Specifies how to reach a WebDriver server.
#[derive(Debug, Clone)]
pub enum LaunchMode {
    /// Connect to an already-running server at the given base URL.
    Connect { endpoint: String },
    /// Spawn the driver binary locally on an unused port.
    Launch {
        driver_path: String,
        driver_args: Vec<String>,
    },
}

impl LaunchMode {
    /// Connect when an endpoint is configured, launch otherwise.
    pub fn from_config(cfg: &WebDriverConfig) -> Self {
        match &cfg.endpoint {
            Some(endpoint) => LaunchMode::Connect {
                endpoint: endpoint.clone(),
            },
            None => LaunchMode::Launch {
                driver_path: cfg.driver_path.clone(),
                driver_args: cfg.driver_args.clone(),
            },
        }
    }
}

/// Builds the session capabilities from configuration: headless flag and
/// browser arguments, plus the explicit page-load timeout so the run never
/// depends on the driver's default.
pub fn capabilities_from_config(cfg: &WebDriverConfig) -> Capabilities {
    let mut args = cfg.browser_args.clone();
    if cfg.headless {
        args.insert(0, "--headless=new".to_string());
    }
    Capabilities {
        browser_name: None,
        chrome_options: Some(ChromeOptions { args }),
        timeouts: Some(Timeouts {
            page_load: cfg.page_load_timeout_ms,
            script: 30_000,
            implicit: 0,
        }),
    }
}

/// Starts a browser session according to `mode`.
///
/// In launch mode the driver process is spawned first and polled until its
/// `/status` endpoint reports ready; in connect mode the configured endpoint
/// is used as-is. Either way exactly one session is created on the server,
/// and the returned handle owns it exclusively.
pub async fn start_session(
    mode: LaunchMode,
    cfg: &WebDriverConfig,
) -> Result<Session, WebDriverError> {
    let connect_timeout = Duration::from_millis(cfg.connect_timeout_ms);
    let request_timeout = Duration::from_millis(cfg.request_timeout_ms);

    let (driver, launcher) = match mode {
        LaunchMode::Connect { endpoint } => {
            info!("Connecting to existing WebDriver server at {}", endpoint);
            let driver = HttpWebDriver::new(&endpoint, connect_timeout, request_timeout)?;
            (driver, None)
        }
        LaunchMode::Launch {
            driver_path,
            driver_args,
        } => {
            let mut launcher = DriverLauncher::new()?;
            launcher.spawn(&driver_path, &driver_args)?;
            info!("Launched driver '{}' on port {}", driver_path, launcher.port());
            let driver = HttpWebDriver::new(&launcher.endpoint(), connect_timeout, request_timeout)?;
            driver.wait_until_ready(READY_POLL_ATTEMPTS, READY_POLL_DELAY).await?;
            (driver, Some(launcher))
        }
    };

    let capabilities = capabilities_from_config(cfg);
    let id = driver.new_session(&capabilities).await?;
    debug!("Session created: {}", id);

    Ok(Session {
        driver: Arc::new(driver),
        id,
        launcher,
    })
}

/// A live browser session: created once, owned exclusively, destroyed
/// exactly once via [`quit`](Session::quit), which consumes the handle.
#[derive(Debug)]
pub struct Session {
    driver: Arc<dyn WebDriver>,
    id: SessionId,
    // Present in launch mode; dropping it kills the driver process, so an
    // abandoned handle still cannot leak the process.
    launcher: Option<DriverLauncher>,
}

impl Session {
    /// Wraps an externally created session. `quit` still deletes it on the
    /// server, but no local driver process is owned.
    pub fn attach(driver: Arc<dyn WebDriver>, id: SessionId) -> Self {
        Self {
            driver,
            id,
            launcher: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        self.driver.navigate(&self.id, url).await
    }

    /// Finite snapshot of the elements matching `selector` at call time.
    /// A fresh call re-queries the page.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<ElementRef>, WebDriverError> {
        self.driver.find_elements(&self.id, selector).await
    }

    pub async fn find_elements_within(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>, WebDriverError> {
        self.driver
            .find_elements_within(&self.id, element, selector)
            .await
    }

    pub async fn element_text(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        self.driver.element_text(&self.id, element).await
    }

    /// Deletes the session on the server and shuts down a locally spawned
    /// driver process. Consuming `self` makes a second release
    /// unrepresentable.
    pub async fn quit(mut self) -> Result<(), WebDriverError> {
        debug!("Deleting session {}", self.id);
        let result = self.driver.delete_session(&self.id).await;
        if let Some(mut launcher) = self.launcher.take() {
            launcher.shutdown();
        }
        result
    }
}
