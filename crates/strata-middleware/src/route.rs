//! The seam between the pipeline and a router.
//!
//! The pipeline does not match paths itself. It asks a [`RouteResolver`]
//! for the handler of a request, together with the operation id and the
//! ordered names of the stages that apply to that route.

use http::Method;
use std::collections::HashMap;
use strata_core::Handler;

/// The router's answer for a matched request.
pub struct ResolvedRoute<'r> {
    /// Operation identifier, e.g. `"getItem"`.
    pub operation_id: &'r str,
    /// The route's business logic.
    pub handler: &'r dyn Handler,
    /// Route-scoped stage names, in declaration order.
    pub stages: &'r [&'static str],
    /// Path parameters extracted from the matched path.
    pub params: HashMap<String, String>,
}

impl std::fmt::Debug for ResolvedRoute<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("operation_id", &self.operation_id)
            .field("stages", &self.stages)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Resolves a method and path to a route.
pub trait RouteResolver: Send + Sync {
    /// Returns the matched route, or `None` when nothing matches.
    fn resolve(&self, method: &Method, path: &str) -> Option<ResolvedRoute<'_>>;
}
