//! Logging interceptor.
//!
//! Logs before the handler runs and again once it settles, with the
//! outcome and the elapsed time in milliseconds. Each settled request is
//! also recorded in the request counter and duration histogram.

use crate::context::MiddlewareContext;
use crate::interceptor::{AfterGuard, Interceptor, Next, Settlement};
use std::time::Instant;
use strata_core::{BoxFuture, Outcome};
use strata_telemetry::metrics;

/// Interceptor registered under the name `logging`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl LoggingInterceptor {
    /// Creates the interceptor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn intercept<'a>(
        &'a self,
        ctx: &'a MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let request_id = ctx.request_id();
            let operation = ctx.operation_id().unwrap_or("unknown").to_string();
            tracing::info!(
                request_id = %request_id,
                http.method = %ctx.method(),
                http.path = ctx.path(),
                operation_id = %operation,
                "before handler"
            );

            let started = Instant::now();
            let guard = AfterGuard::new(move |settlement: Settlement| {
                let elapsed = started.elapsed();
                let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                match &settlement {
                    Settlement::Succeeded { status } => tracing::info!(
                        request_id = %request_id,
                        http.status_code = status.as_u16(),
                        duration_ms,
                        "after handler"
                    ),
                    Settlement::Failed { category, message } => tracing::warn!(
                        request_id = %request_id,
                        category = ?category,
                        error = %message,
                        duration_ms,
                        "after handler failed"
                    ),
                    Settlement::Aborted => tracing::warn!(
                        request_id = %request_id,
                        duration_ms,
                        "after handler aborted"
                    ),
                }
                metrics::record_request(&operation, settlement.label(), elapsed);
            });

            let outcome = next.run(ctx).await;
            guard.settle(&outcome);
            outcome
        })
    }
}
