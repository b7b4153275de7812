//! # Strata Middleware
//!
//! The request pipeline for Strata.
//!
//! ## Pipeline
//!
//! ```text
//! Request → Global stages → Routing → Scoped stages → Interceptors(before)
//!                                                          ↓
//! Response ← Projection ← Interceptors(after, reverse) ← Handler
//! ```
//!
//! | Phase        | Runs for                   | Registered with                 |
//! |--------------|----------------------------|---------------------------------|
//! | Global       | every request              | [`PipelineBuilder::global`]     |
//! | Scoped       | routes naming the stage    | [`PipelineBuilder::scoped`]     |
//! | Interception | routes naming the stage    | [`PipelineBuilder::interceptor`]|
//! | Projection   | replies of registered kind | [`PipelineBuilder::schemas`]    |
//!
//! ## Example
//!
//! ```
//! use strata_middleware::Phase;
//!
//! let phases = Phase::all();
//! assert_eq!(phases[1].name(), "global");
//! assert_eq!(phases[6].name(), "emission");
//! ```

#![doc(html_root_url = "https://docs.rs/strata-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod interceptor;
pub mod middleware;
pub mod pipeline;
pub mod projection;
pub mod route;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use interceptor::{AfterGuard, FnInterceptor, Interceptor, Next, Settlement};
pub use middleware::{FnMiddleware, Middleware};
pub use pipeline::{BoxedInterceptor, BoxedMiddleware, Phase, Pipeline, PipelineBuilder};
pub use projection::{SchemaRegistry, Visibility, VisibilitySchema};
pub use route::{ResolvedRoute, RouteResolver};
pub use types::{Request, RequestHead};
