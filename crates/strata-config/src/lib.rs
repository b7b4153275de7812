//! Typed configuration for the Strata server.
//!
//! - TOML and JSON configuration files
//! - `.env` files via `dotenvy`
//! - Environment overrides, `STRATA__SECTION__KEY`
//! - A bare `PORT` variable that wins for the listening port
//! - Strict validation that rejects unknown fields
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! trust_request_id = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "pretty"
//! include_location = false
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::StrataConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LoggingSection, ServerSection};
pub use strata_telemetry::LogFormat;
