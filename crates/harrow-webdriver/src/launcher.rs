//! Spawns and owns a local WebDriver server process.

use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use tokio::process::{Child, Command};

use crate::error::WebDriverError;

pub(crate) const READY_POLL_ATTEMPTS: u32 = 50;
pub(crate) const READY_POLL_DELAY: Duration = Duration::from_millis(100);

/// Owns a locally spawned driver process (chromedriver, geckodriver, ...).
/// The process is killed when the launcher is dropped, so an aborted run
/// cannot leak it.
#[derive(Debug)]
pub struct DriverLauncher {
    port: u16,
    process: Option<Child>,
}

impl DriverLauncher {
    pub fn new() -> Result<Self, WebDriverError> {
        let port = portpicker::pick_unused_port()
            .ok_or_else(|| WebDriverError::Launch("Failed to find an available port".to_string()))?;

        Ok(Self {
            port,
            process: None,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Starts `driver_path` listening on this launcher's port. The server
    /// is not usable until its `/status` endpoint reports ready.
    pub fn spawn(&mut self, driver_path: &str, extra_args: &[String]) -> Result<(), WebDriverError> {
        let mut command = Command::new(driver_path);
        command
            .arg(format!("--port={}", self.port))
            .args(extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!("Spawning driver: {} --port={}", driver_path, self.port);
        let child = command.spawn().map_err(|e| {
            WebDriverError::Launch(format!("failed to spawn '{driver_path}': {e}"))
        })?;
        self.process = Some(child);
        Ok(())
    }

    pub fn shutdown(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.start_kill() {
                warn!("Failed to kill driver process: {}", e);
            }
        }
    }
}

impl Drop for DriverLauncher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
