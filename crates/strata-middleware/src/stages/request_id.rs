//! Request ID middleware.
//!
//! Every request gets a UUID v7 request id. When configured to trust
//! upstream callers, a well-formed `x-request-id` header is adopted
//! instead; malformed values are ignored. The transport echoes the final
//! id on the response.

use crate::context::MiddlewareContext;
use crate::middleware::Middleware;
use crate::types::RequestHead;
use strata_core::{BoxFuture, RequestId, StrataResult};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or adopts request IDs.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to trust incoming request ID headers.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates fresh ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that adopts incoming `x-request-id` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    /// Creates a middleware from a flag, as read from configuration.
    #[must_use]
    pub fn with_trust(trust_incoming: bool) -> Self {
        Self { trust_incoming }
    }

    fn extract_request_id(&self, head: &RequestHead) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        head.headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        head: &'a RequestHead,
    ) -> BoxFuture<'a, StrataResult<()>> {
        Box::pin(async move {
            let request_id = self.extract_request_id(head).unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);
            Ok(())
        })
    }
}
