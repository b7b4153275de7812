//! Pre-processing middleware.
//!
//! A [`Middleware`] runs ahead of the handler and sees only the request
//! head. It can enrich the [`MiddlewareContext`] or reject the request by
//! returning an error, which ends the pipeline for that request. It cannot
//! observe the handler's result; wrapping logic belongs in an
//! [`Interceptor`](crate::Interceptor).
//!
//! The same trait serves global stages (run for every request, ahead of
//! routing) and route-scoped stages (run only for routes that name them).
//! Which one a middleware is depends on how it is registered with the
//! [`PipelineBuilder`](crate::PipelineBuilder).

use crate::context::MiddlewareContext;
use crate::types::RequestHead;
use strata_core::{BoxFuture, StrataResult};

/// The pre-processing middleware trait.
///
/// # Example
///
/// ```
/// use strata_core::{BoxFuture, StrataResult};
/// use strata_middleware::{Middleware, MiddlewareContext, RequestHead};
///
/// struct Audit;
///
/// impl Middleware for Audit {
///     fn name(&self) -> &'static str {
///         "audit"
///     }
///
///     fn process<'a>(
///         &'a self,
///         ctx: &'a mut MiddlewareContext,
///         head: &'a RequestHead,
///     ) -> BoxFuture<'a, StrataResult<()>> {
///         Box::pin(async move {
///             tracing::info!(request_id = %ctx.request_id(), path = head.uri.path(), "audit");
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this stage.
    ///
    /// Routes refer to scoped stages by this name.
    fn name(&self) -> &'static str;

    /// Processes the request head.
    ///
    /// Returning an error skips the remaining pre-processing and the
    /// handler.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        head: &'a RequestHead,
    ) -> BoxFuture<'a, StrataResult<()>>;
}

/// A middleware built from a synchronous closure.
///
/// # Example
///
/// ```
/// use strata_core::StrataResult;
/// use strata_middleware::{FnMiddleware, Middleware, MiddlewareContext, RequestHead};
///
/// let noop = FnMiddleware::new(
///     "noop",
///     |_ctx: &mut MiddlewareContext, _head: &RequestHead| -> StrataResult<()> { Ok(()) },
/// );
/// assert_eq!(noop.name(), "noop");
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut MiddlewareContext, &RequestHead) -> StrataResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        head: &'a RequestHead,
    ) -> BoxFuture<'a, StrataResult<()>> {
        let result = (self.func)(ctx, head);
        Box::pin(async move { result })
    }
}
