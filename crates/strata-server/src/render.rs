//! Outcome rendering.
//!
//! Turns the pipeline's [`Outcome`] into an HTTP response. Every response
//! is JSON and carries the request id in `x-request-id`.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use http_body_util::Full;
use strata_core::{ErrorCategory, Outcome, RequestId};
use strata_middleware::stages::REQUEST_ID_HEADER;

/// The response type produced by the server.
pub type HttpResponse = Response<Full<Bytes>>;

const FALLBACK_BODY: &[u8] =
    br#"{"error":{"code":"INTERNAL_ERROR","message":"An internal error occurred","category":"internal"}}"#;

/// Renders an outcome.
///
/// Successful replies keep their own status. Errors are rendered as an
/// [`ErrorEnvelope`](strata_core::ErrorEnvelope) with the status of their
/// category; internal messages are not exposed.
#[must_use]
pub fn render(outcome: Outcome, request_id: RequestId) -> HttpResponse {
    let id = request_id.to_string();
    let (status, body) = match outcome {
        Ok(reply) => (reply.status(), serde_json::to_vec(reply.body())),
        Err(error) => {
            if error.category() == ErrorCategory::Internal {
                tracing::error!(request_id = %id, error = %error, "request failed");
            }
            (
                error.status_code(),
                serde_json::to_vec(&error.to_envelope(Some(&id))),
            )
        }
    };

    match body {
        Ok(body) => json_response(status, Bytes::from(body), &id),
        Err(e) => {
            tracing::error!(request_id = %id, error = %e, "failed to encode response body");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(FALLBACK_BODY),
                &id,
            )
        }
    }
}

fn json_response(status: StatusCode, body: Bytes, request_id: &str) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    response
}
