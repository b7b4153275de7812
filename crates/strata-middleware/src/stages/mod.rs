//! Built-in stages.
//!
//! ## Global (every request, before routing)
//!
//! 1. [`request_id`] - adopt or generate the request id
//! 2. [`request_logger`] - [`RequestLogger::global`] logs method and path
//!
//! ## Route-scoped (named by routes)
//!
//! - `request_logger` - [`RequestLogger::scoped`]
//! - `logging` - [`LoggingInterceptor`], before/after logs with elapsed time

pub mod logging;
pub mod request_id;
pub mod request_logger;

pub use logging::LoggingInterceptor;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
pub use request_logger::RequestLogger;
