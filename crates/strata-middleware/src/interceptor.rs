//! Interceptors: logic around the handler.
//!
//! An [`Interceptor`] runs immediately before the handler and again after
//! it settles. It receives a [`Next`] continuation, calls it exactly once
//! (`run` consumes it) and returns the outcome unchanged.
//!
//! After-logic is attached to an [`AfterGuard`] created in the before
//! step. The guard is settled with the outcome on the normal path; if the
//! request future is dropped or unwinds before that, the guard's `Drop`
//! runs the after-logic with [`Settlement::Aborted`]. Either way it runs
//! once.
//!
//! Interceptors nest in declaration order:
//!
//! ```text
//! first.before → second.before → handler → second.after → first.after
//! ```

use crate::context::MiddlewareContext;
use futures_util::FutureExt;
use http::StatusCode;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use strata_core::{BoxFuture, ErrorCategory, Handler, HandlerInput, Outcome, StrataError};

/// The interceptor trait.
///
/// # Invariants
///
/// - `next.run()` is called exactly once
/// - the outcome is returned unmodified; errors are never swallowed
pub trait Interceptor: Send + Sync + 'static {
    /// Returns the unique name of this interceptor.
    ///
    /// Routes refer to interceptors by this name.
    fn name(&self) -> &'static str;

    /// Wraps the rest of the chain.
    fn intercept<'a>(&'a self, ctx: &'a MiddlewareContext, next: Next<'a>)
        -> BoxFuture<'a, Outcome>;
}

/// Continuation to the next interceptor, or to the handler.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        interceptor: &'a dyn Interceptor,
        next: Box<Next<'a>>,
    },
    Handler {
        handler: &'a dyn Handler,
        input: HandlerInput,
    },
}

impl<'a> Next<'a> {
    /// Creates a `Next` that enters `interceptor`, which in turn continues
    /// with `next`.
    pub(crate) fn new(interceptor: &'a dyn Interceptor, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                interceptor,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal `Next` that invokes the handler.
    pub fn handler(handler: &'a dyn Handler, input: HandlerInput) -> Self {
        Self {
            inner: NextInner::Handler { handler, input },
        }
    }

    /// Invokes the next interceptor or the handler.
    ///
    /// A panic inside the handler is caught here and surfaces as an
    /// internal error, so every enclosing interceptor sees it as a normal
    /// failure.
    pub async fn run(self, ctx: &'a MiddlewareContext) -> Outcome {
        match self.inner {
            NextInner::Chain { interceptor, next } => interceptor.intercept(ctx, *next).await,
            NextInner::Handler { handler, input } => {
                let call = AssertUnwindSafe(async move { handler.call(input).await });
                match call.catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(
                            request_id = %ctx.request_id(),
                            panic = %message,
                            "handler panicked"
                        );
                        Err(StrataError::internal(format!("handler panicked: {message}")))
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic payload")
    }
}

/// How the wrapped chain settled, as seen by after-logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The chain produced a reply. Absent replies count as success.
    Succeeded {
        /// Status of the reply.
        status: StatusCode,
    },
    /// The chain produced an error.
    Failed {
        /// Category of the error.
        category: ErrorCategory,
        /// The error's display form.
        message: String,
    },
    /// The chain never settled (cancelled or unwound).
    Aborted,
}

impl Settlement {
    /// Builds the settlement for an outcome.
    #[must_use]
    pub fn of(outcome: &Outcome) -> Self {
        match outcome {
            Ok(reply) => Self::Succeeded {
                status: reply.status(),
            },
            Err(err) => Self::Failed {
                category: err.category(),
                message: err.to_string(),
            },
        }
    }

    /// Short label used in logs and metric labels.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "success",
            Self::Failed { .. } => "error",
            Self::Aborted => "aborted",
        }
    }
}

/// Runs after-logic exactly once.
///
/// # Example
///
/// ```
/// use strata_core::{Outcome, Reply};
/// use strata_middleware::{AfterGuard, Settlement};
///
/// let mut seen = Vec::new();
/// {
///     let guard = AfterGuard::new(|s: Settlement| seen.push(s.label()));
///     let outcome: Outcome = Ok(Reply::json(serde_json::Value::Null));
///     guard.settle(&outcome);
/// }
/// {
///     let _dropped = AfterGuard::new(|s: Settlement| seen.push(s.label()));
/// }
/// assert_eq!(seen, vec!["success", "aborted"]);
/// ```
pub struct AfterGuard<F: FnOnce(Settlement)> {
    hook: Option<F>,
}

impl<F: FnOnce(Settlement)> AfterGuard<F> {
    /// Arms the guard with its after-logic.
    pub const fn new(hook: F) -> Self {
        Self { hook: Some(hook) }
    }

    /// Runs the after-logic with the settled outcome.
    pub fn settle(mut self, outcome: &Outcome) {
        if let Some(hook) = self.hook.take() {
            hook(Settlement::of(outcome));
        }
    }
}

impl<F: FnOnce(Settlement)> Drop for AfterGuard<F> {
    fn drop(&mut self) {
        if let Some(hook) = self.hook.take() {
            hook(Settlement::Aborted);
        }
    }
}

/// An interceptor built from a before and an after closure.
///
/// # Example
///
/// ```
/// use strata_middleware::{FnInterceptor, Interceptor, MiddlewareContext, Settlement};
///
/// let timing = FnInterceptor::new(
///     "timing",
///     |ctx: &MiddlewareContext| tracing::debug!(path = ctx.path(), "before"),
///     |ctx: &MiddlewareContext, s: &Settlement| {
///         tracing::debug!(elapsed = ?ctx.elapsed(), outcome = s.label(), "after");
///     },
/// );
/// assert_eq!(timing.name(), "timing");
/// ```
pub struct FnInterceptor<B, A> {
    name: &'static str,
    before: B,
    after: A,
}

impl<B, A> FnInterceptor<B, A> {
    /// Creates a new function-based interceptor.
    pub const fn new(name: &'static str, before: B, after: A) -> Self {
        Self {
            name,
            before,
            after,
        }
    }
}

impl<B, A> Interceptor for FnInterceptor<B, A>
where
    B: Fn(&MiddlewareContext) + Send + Sync + 'static,
    A: Fn(&MiddlewareContext, &Settlement) + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn intercept<'a>(
        &'a self,
        ctx: &'a MiddlewareContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            (self.before)(ctx);
            let guard = AfterGuard::new(|settlement: Settlement| (self.after)(ctx, &settlement));
            let outcome = next.run(ctx).await;
            guard.settle(&outcome);
            outcome
        })
    }
}
