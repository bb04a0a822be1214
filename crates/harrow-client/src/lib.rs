//! # Harrow Client
//!
//! The public extractor API: one [`PageExtractor`] performs a single
//! navigate-locate-extract-release cycle against one page and guarantees
//! the browser session is released on every exit path.
//!
//! ```no_run
//! use harrow_client::PageExtractor;
//! use harrow_core::Config;
//!
//! # async fn demo() -> Result<(), harrow_client::ExtractError> {
//! let extractor = PageExtractor::new(Config::default());
//! let extraction = extractor.run().await?;
//! # let _ = extraction;
//! # Ok(())
//! # }
//! ```

mod error;
mod extractor;
pub mod fields;

pub use error::ExtractError;
pub use extractor::{Extraction, OpenPage, PageExtractor, Row, RowHandle};
pub use fields::Field;

// Re-export the configuration surface for user convenience
pub use harrow_core::config::{Config, ExtractorConfig, FieldStrategy, load_config};
