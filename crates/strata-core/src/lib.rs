//! # Strata Core
//!
//! Core types and traits shared by every Strata crate.
//!
//! - [`RequestId`] - UUID v7 request identifier
//! - [`StrataError`] - Standard error type with HTTP status mapping
//! - [`Reply`] - What a handler produces on success
//! - [`Handler`] - Type-erased route handler
//! - [`HandlerInput`] - Path parameters and body handed to a handler
//! - [`FromInput`] and [`coerce`] - Handler arguments coerced before the call
//! - [`Resource`] - Marker for records that carry a visibility schema

#![doc(html_root_url = "https://docs.rs/strata-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod extract;
mod handler;
mod input;
mod reply;

pub use context::RequestId;
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, StrataError, StrataResult};
pub use extract::{coerce, FromInput, Json};
pub use handler::{BoxFuture, Handler, Outcome};
pub use input::HandlerInput;
pub use reply::{Reply, ReplyKind, Resource};
