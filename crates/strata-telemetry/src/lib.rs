//! Observability for Strata.
//!
//! - **Logging**: structured logs through `tracing-subscriber`, JSON for
//!   production and pretty for development
//! - **Metrics**: request counters and latency histograms through the
//!   `metrics` facade. Nothing is exported until the binary installs a
//!   recorder; without one every call is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `strata_requests_total` | Counter | `operation`, `outcome` | Settled requests |
//! | `strata_request_duration_seconds` | Histogram | `operation` | Handler latency |
//! | `strata_in_flight_requests` | Gauge | - | Requests being served |
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging");
//! tracing::info!(operation_id = "listItems", "serving");
//! ```

#![doc(html_root_url = "https://docs.rs/strata-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
pub use self::metrics::{describe_metrics, record_request, InFlightGuard};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
