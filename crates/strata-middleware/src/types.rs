//! Request types used throughout the pipeline.

use bytes::Bytes;

/// The request handed to [`Pipeline::dispatch`](crate::Pipeline::dispatch).
///
/// The transport collects the body before dispatching, so the pipeline
/// works on a plain `http::Request<Bytes>`.
pub type Request = http::Request<Bytes>;

/// Method, URI, headers and extensions of a request, without its body.
///
/// Pre-processing stages only ever see the head; the body goes to the
/// handler untouched.
pub type RequestHead = http::request::Parts;
