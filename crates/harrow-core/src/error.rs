use thiserror::Error;

// Re-export for convenience elsewhere
pub use ::config::ConfigError;

/// Errors produced by the core layer (configuration loading and validation,
/// logging setup).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Logging setup failed: {0}")]
    LoggingSetup(String),
}
