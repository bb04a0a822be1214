//! Run-to-completion entry point: load configuration, run one extraction,
//! print the result to stdout, exit nonzero on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use harrow_client::{Extraction, PageExtractor};
use harrow_core::{config, logging};

/// Extract table rows from a single page via WebDriver.
#[derive(Parser, Debug)]
#[command(name = "harrow", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page to load (overrides the configured URL).
    #[arg(long)]
    url: Option<String>,

    /// Structural selector for table rows.
    #[arg(long)]
    row_selector: Option<String>,

    /// Structural selector for cells within a row.
    #[arg(long)]
    cell_selector: Option<String>,

    /// Base URL of an already-running WebDriver server; when absent the
    /// configured driver binary is launched locally.
    #[arg(long)]
    endpoint: Option<String>,

    /// Read only the first matching row and apply the field strategy.
    #[arg(long)]
    first_row: bool,

    /// Page-load timeout in milliseconds.
    #[arg(long)]
    page_load_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut cfg = match config::load_config(cli.config.clone()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("harrow: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::setup_logging(&cfg.global.log_level) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    if let Some(url) = cli.url {
        cfg.extractor.url = url;
    }
    if let Some(selector) = cli.row_selector {
        cfg.extractor.row_selector = selector;
    }
    if let Some(selector) = cli.cell_selector {
        cfg.extractor.cell_selector = selector;
    }
    if let Some(endpoint) = cli.endpoint {
        cfg.webdriver.endpoint = Some(endpoint);
    }
    if cli.first_row {
        cfg.extractor.first_row_only = true;
    }
    if let Some(ms) = cli.page_load_timeout_ms {
        cfg.webdriver.page_load_timeout_ms = ms;
    }

    info!("Extracting {}", cfg.extractor.url);
    let extractor = PageExtractor::new(cfg);

    match extractor.run().await {
        Ok(extraction) => {
            print_extraction(&extraction);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Extraction failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_extraction(extraction: &Extraction) {
    match extraction {
        Extraction::Table(rows) => {
            for row in rows {
                println!("{}", row.cells.join(" | "));
            }
        }
        Extraction::FirstRow(fields) => {
            if fields.iter().any(|f| f.name.is_some()) {
                for field in fields {
                    println!("{}: {}", field.name.as_deref().unwrap_or("-"), field.value);
                }
            } else {
                let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
                println!("{values:?}");
            }
        }
    }
}
