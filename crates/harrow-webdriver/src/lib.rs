//! # Harrow WebDriver (wire layer)
//!
//! This crate handles the low-level details of talking to a W3C WebDriver
//! server over HTTP: typed protocol structs, the [`WebDriver`] trait and its
//! reqwest-backed implementation, a launcher for spawning the driver binary
//! locally, and the owned [`Session`] handle built on top of them.
//!
//! The extraction logic itself lives in `harrow-client`; nothing here knows
//! about rows or tables.

pub mod client;
pub mod error;
pub mod launcher;
pub mod protocol;
pub mod session;

// Re-export key items
pub use client::{HttpWebDriver, WebDriver};
pub use error::WebDriverError;
pub use launcher::DriverLauncher;
pub use protocol::{Capabilities, ElementRef, SessionId, StatusValue};
pub use session::{LaunchMode, Session, start_session};
