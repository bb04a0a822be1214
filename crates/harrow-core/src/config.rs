use std::path::PathBuf;

use serde::Deserialize;

use crate::error::CoreError;

/// Top-level configuration for one extraction run.
///
/// Every section has baked-in defaults via `#[serde(default)]`, so an empty
/// configuration file (or none at all) yields a runnable setup pointed at
/// the default target page.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub global: GlobalConfig,
    pub extractor: ExtractorConfig,
    pub webdriver: WebDriverConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// What to extract: the target page, the structural selectors, and how the
/// result is shaped.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ExtractorConfig {
    /// The page to load. The default is the course-schedule page this tool
    /// was originally written against; treat it as a plain parameter.
    pub url: String,
    /// Structural selector for table rows.
    pub row_selector: String,
    /// Structural selector for cell elements within a row.
    pub cell_selector: String,
    /// Fail with an element-not-found error when the row selector matches
    /// nothing, instead of reporting an empty success.
    pub require_rows: bool,
    /// Legacy mode: read only the first matching row and run the field
    /// strategy over its whole text.
    pub first_row_only: bool,
    /// How fields are pulled out of a row in first-row mode.
    pub fields: FieldStrategy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            url: "https://connect.wofford.edu/myWofford/registrar/courseSchedule.aspx"
                .to_string(),
            row_selector: "tbody tr".to_string(),
            cell_selector: "th, td".to_string(),
            require_rows: true,
            first_row_only: false,
            fields: FieldStrategy::default(),
        }
    }
}

/// Strategy for turning one row into a sequence of field values.
///
/// `Splice` reproduces the historical behavior: split the row's whole text
/// on whitespace and drop `count` tokens starting at `start`. `Columns`
/// names fields and draws each from a cell position instead of relying on
/// the exact text layout.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FieldStrategy {
    Splice { start: usize, count: usize },
    Columns { fields: Vec<FieldRule> },
}

impl Default for FieldStrategy {
    fn default() -> Self {
        // the legacy splice(4, 7) behavior
        FieldStrategy::Splice { start: 4, count: 7 }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: String,
    pub cell: usize,
}

/// How to reach a WebDriver server, and the timeouts applied to it.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WebDriverConfig {
    /// Base URL of an already-running WebDriver server. When unset, the
    /// driver binary is launched locally on an unused port instead.
    pub endpoint: Option<String>,
    /// Driver binary to launch in launch mode.
    pub driver_path: String,
    /// Extra arguments passed to the driver binary.
    pub driver_args: Vec<String>,
    /// Arguments passed to the browser itself via capabilities.
    pub browser_args: Vec<String>,
    pub headless: bool,
    pub connect_timeout_ms: u64,
    /// Upper bound for any single wire request. Must exceed the page-load
    /// timeout, since navigation blocks until the page finishes loading.
    pub request_timeout_ms: u64,
    pub page_load_timeout_ms: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            driver_path: "chromedriver".to_string(),
            driver_args: vec![],
            browser_args: vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-gpu".to_string(),
                "--window-size=1920,1080".to_string(),
            ],
            headless: true,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 60_000,
            page_load_timeout_ms: 30_000,
        }
    }
}

impl WebDriverConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.request_timeout_ms <= self.page_load_timeout_ms {
            return Err(CoreError::InvalidConfig(format!(
                "request_timeout_ms ({}) must exceed page_load_timeout_ms ({})",
                self.request_timeout_ms, self.page_load_timeout_ms
            )));
        }
        if self.driver_path.is_empty() && self.endpoint.is_none() {
            return Err(CoreError::InvalidConfig(
                "either webdriver.endpoint or webdriver.driver_path must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads configuration from an optional TOML file plus `HARROW_`-prefixed
/// environment variables (e.g. `HARROW_EXTRACTOR__URL`). File values
/// override struct defaults; environment values override the file.
pub fn load_config(source_path: Option<PathBuf>) -> Result<Config, CoreError> {
    let default_config_name = "harrow";

    let mut builder = config::Config::builder();

    if let Some(path) = source_path {
        if path.exists() {
            log::debug!("Loading configuration from: {:?}", path);
            builder = builder.add_source(config::File::from(path).required(true));
        } else {
            log::warn!("Specified configuration file not found: {:?}", path);
        }
    } else {
        log::debug!(
            "Attempting to load configuration from default location ({}.toml)",
            default_config_name
        );
        builder = builder.add_source(config::File::with_name(default_config_name).required(false));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HARROW")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("webdriver.driver_args")
            .with_list_parse_key("webdriver.browser_args"),
    );

    let cfg = builder
        .build()
        .map_err(CoreError::Config)?
        .try_deserialize::<Config>()
        .map_err(CoreError::Config)?;

    cfg.webdriver.validate()?;

    log::debug!("Successfully loaded configuration: {:?}", cfg);
    Ok(cfg)
}
