//! Request loggers.
//!
//! Two loggers share one implementation. [`RequestLogger::global`] runs
//! for every request, matched or not. [`RequestLogger::scoped`] is named
//! by route groups and only sees requests for those routes.

use crate::context::MiddlewareContext;
use crate::middleware::Middleware;
use crate::types::RequestHead;
use strata_core::{BoxFuture, StrataResult};

/// Logs method and path of each request it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLogger {
    name: &'static str,
    scope: &'static str,
}

impl RequestLogger {
    /// The logger registered as a global stage.
    #[must_use]
    pub const fn global() -> Self {
        Self {
            name: "global_logger",
            scope: "global",
        }
    }

    /// The logger registered as a route-scoped stage named `request_logger`.
    #[must_use]
    pub const fn scoped() -> Self {
        Self {
            name: "request_logger",
            scope: "route",
        }
    }

    /// Returns where this logger is attached: `"global"` or `"route"`.
    #[must_use]
    pub const fn scope(&self) -> &'static str {
        self.scope
    }
}

impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        head: &'a RequestHead,
    ) -> BoxFuture<'a, StrataResult<()>> {
        Box::pin(async move {
            tracing::info!(
                request_id = %ctx.request_id(),
                http.method = %head.method,
                http.path = %head.uri,
                scope = self.scope,
                "incoming request"
            );
            Ok(())
        })
    }
}
