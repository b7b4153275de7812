//! Route table and path matching.
//!
//! A [`RouteTable`] maps a method and a path template to a handler, its
//! operation id and the ordered names of the stages that apply to it.
//! Templates use `:name` segments for path parameters:
//!
//! ```
//! use http::Method;
//! use strata_core::{HandlerInput, Reply};
//! use strata_middleware::RouteResolver;
//! use strata_server::{RouteGroup, RouteTable};
//!
//! let ok = |_input: HandlerInput| async { Ok(Reply::json(serde_json::json!({}))) };
//!
//! let table = RouteTable::new()
//!     .route(Method::GET, "/", "info", ok)
//!     .group(
//!         RouteGroup::new("/users")
//!             .stages(&["audit"])
//!             .route(Method::GET, "/:userId", "getUser", ok),
//!     );
//!
//! let route = table.resolve(&Method::GET, "/users/42").unwrap();
//! assert_eq!(route.operation_id, "getUser");
//! assert_eq!(route.stages, &["audit"]);
//! assert_eq!(route.params["userId"], "42");
//! assert!(table.resolve(&Method::DELETE, "/users/42").is_none());
//! ```
//!
//! Matching is linear in registration order. The first route whose method
//! and segments match wins.

use http::Method;
use std::collections::HashMap;
use strata_core::Handler;
use strata_middleware::{ResolvedRoute, RouteResolver};

/// A segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// A literal segment, e.g. `items`.
    Literal(String),

    /// A parameter segment, e.g. `:id`.
    Param(String),
}

fn parse_segments(pattern: &str) -> Vec<PathSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix(':') {
            Some(name) => PathSegment::Param(name.to_string()),
            None => PathSegment::Literal(s.to_string()),
        })
        .collect()
}

/// A registered route.
struct Route {
    method: Method,
    pattern: String,
    segments: Vec<PathSegment>,
    operation_id: String,
    stages: &'static [&'static str],
    handler: Box<dyn Handler>,
}

impl Route {
    fn new<H: Handler>(
        method: Method,
        pattern: String,
        operation_id: &str,
        stages: &'static [&'static str],
        handler: H,
    ) -> Self {
        Self {
            method,
            segments: parse_segments(&pattern),
            pattern,
            operation_id: operation_id.to_string(),
            stages,
            handler: Box::new(handler),
        }
    }

    /// Returns the extracted parameters if this route matches the path.
    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if actual.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, value) in self.segments.iter().zip(actual) {
            match segment {
                PathSegment::Literal(expected) if expected != value => return None,
                PathSegment::Literal(_) => {}
                PathSegment::Param(name) => {
                    params.insert(name.clone(), value.to_string());
                }
            }
        }
        Some(params)
    }
}

/// Routes sharing a path prefix and a list of stages.
pub struct RouteGroup {
    prefix: String,
    stages: &'static [&'static str],
    routes: Vec<Route>,
}

impl RouteGroup {
    /// Creates an empty group under `prefix`. The group has no stages
    /// until [`stages`](Self::stages) is called.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            stages: &[],
            routes: Vec::new(),
        }
    }

    /// Sets the stages applied to every route of this group, in order.
    ///
    /// Applies to routes declared after the call.
    #[must_use]
    pub fn stages(mut self, stages: &'static [&'static str]) -> Self {
        self.stages = stages;
        self
    }

    /// Declares a route relative to the group prefix.
    #[must_use]
    pub fn route<H: Handler>(
        mut self,
        method: Method,
        pattern: &str,
        operation_id: &str,
        handler: H,
    ) -> Self {
        let full = format!("{}/{}", self.prefix, pattern.trim_start_matches('/'));
        self.routes
            .push(Route::new(method, full, operation_id, self.stages, handler));
        self
    }
}

/// The route table.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.routes
                    .iter()
                    .map(|r| format!("{} {} ({})", r.method, r.pattern, r.operation_id)),
            )
            .finish()
    }
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a route with no stages.
    #[must_use]
    pub fn route<H: Handler>(
        mut self,
        method: Method,
        pattern: &str,
        operation_id: &str,
        handler: H,
    ) -> Self {
        self.routes
            .push(Route::new(method, pattern.to_string(), operation_id, &[], handler));
        self
    }

    /// Adds every route of a group.
    #[must_use]
    pub fn group(mut self, group: RouteGroup) -> Self {
        self.routes.extend(group.routes);
        self
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns each operation id with the stages its route names.
    pub fn stage_lists(&self) -> impl Iterator<Item = (&str, &'static [&'static str])> {
        self.routes
            .iter()
            .map(|r| (r.operation_id.as_str(), r.stages))
    }
}

impl RouteResolver for RouteTable {
    fn resolve(&self, method: &Method, path: &str) -> Option<ResolvedRoute<'_>> {
        self.routes
            .iter()
            .filter(|route| &route.method == method)
            .find_map(|route| {
                route.match_path(path).map(|params| ResolvedRoute {
                    operation_id: &route.operation_id,
                    handler: route.handler.as_ref(),
                    stages: route.stages,
                    params,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{HandlerInput, Reply};

    fn ok(_input: HandlerInput) -> impl std::future::Future<Output = strata_core::Outcome> {
        async { Ok(Reply::json(serde_json::Value::Null)) }
    }

    fn table() -> RouteTable {
        RouteTable::new().route(Method::GET, "/", "info", ok).group(
            RouteGroup::new("/items")
                .stages(&["request_logger", "logging"])
                .route(Method::GET, "/", "listItems", ok)
                .route(Method::GET, "/:id", "getItem", ok)
                .route(Method::POST, "", "createItem", ok)
                .route(Method::PUT, "/:id", "updateItem", ok)
                .route(Method::DELETE, "/:id", "deleteItem", ok),
        )
    }

    #[test]
    fn test_root_route() {
        let table = table();
        let route = table.resolve(&Method::GET, "/").unwrap();
        assert_eq!(route.operation_id, "info");
        assert!(route.stages.is_empty());
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_group_prefix_and_stages() {
        let table = table();
        let route = table.resolve(&Method::POST, "/items").unwrap();
        assert_eq!(route.operation_id, "createItem");
        assert_eq!(route.stages, &["request_logger", "logging"]);

        assert_eq!(
            table.resolve(&Method::GET, "/items").unwrap().operation_id,
            "listItems"
        );
    }

    #[test]
    fn test_param_extraction() {
        let table = table();
        let route = table.resolve(&Method::PUT, "/items/17").unwrap();
        assert_eq!(route.operation_id, "updateItem");
        assert_eq!(route.params.get("id").map(String::as_str), Some("17"));
    }

    #[test]
    fn test_param_is_not_coerced_by_the_router() {
        let table = table();
        let route = table.resolve(&Method::GET, "/items/abc").unwrap();
        assert_eq!(route.params["id"], "abc");
    }

    #[test]
    fn test_trailing_slash_matches() {
        let table = table();
        assert_eq!(
            table.resolve(&Method::GET, "/items/3/").unwrap().operation_id,
            "getItem"
        );
    }

    #[test]
    fn test_method_mismatch() {
        assert!(table().resolve(&Method::PATCH, "/items/1").is_none());
        assert!(table().resolve(&Method::POST, "/").is_none());
    }

    #[test]
    fn test_path_mismatch() {
        let table = table();
        assert!(table.resolve(&Method::GET, "/nope").is_none());
        assert!(table.resolve(&Method::GET, "/items/1/extra").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new()
            .route(Method::GET, "/items/latest", "latest", ok)
            .route(Method::GET, "/items/:id", "getItem", ok);
        assert_eq!(
            table.resolve(&Method::GET, "/items/latest").unwrap().operation_id,
            "latest"
        );
    }

    #[test]
    fn test_stage_lists() {
        let table = table();
        assert_eq!(table.len(), 6);
        let lists: Vec<_> = table.stage_lists().collect();
        assert_eq!(lists[0], ("info", &[][..]));
        assert_eq!(lists[2], ("getItem", &["request_logger", "logging"][..]));
    }
}
