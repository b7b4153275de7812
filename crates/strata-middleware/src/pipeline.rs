//! The request pipeline.
//!
//! A [`Pipeline`] composes every stage of request processing into one
//! deterministic sequence:
//!
//! 1. **Global** - every global middleware, in registration order, for
//!    every request. Runs before routing, so unmatched requests are seen.
//! 2. **Routing** - the [`RouteResolver`] picks the handler and names the
//!    route's stages. No match ends the request with `RouteNotFound`.
//! 3. **Scoped** - the route's scoped middleware, in the route's order.
//! 4. **Interception** - the route's interceptors wrap the handler,
//!    nesting in the route's order. Path and body coercion run inside
//!    that scope, before the handler, so interceptors observe those
//!    failures too.
//! 5. **Projection** - replies carrying a registered resource kind are
//!    projected through its visibility schema. Errors skip this.
//! 6. **Emission** - the outcome goes back to the transport.
//!
//! [`Pipeline::dispatch`] runs all of this over a collected request. A
//! transport that is still receiving the body calls [`Pipeline::admit`]
//! with the head, collects the body, then calls [`Pipeline::resume`], so
//! the global stages run even when the body never arrives.
//!
//! Global middleware is registered as such. Scoped middleware and
//! interceptors are registered by name, and routes pick them by name.

use crate::context::MiddlewareContext;
use crate::interceptor::{Interceptor, Next};
use crate::middleware::Middleware;
use crate::projection::SchemaRegistry;
use crate::route::RouteResolver;
use crate::types::{Request, RequestHead};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{HandlerInput, Outcome, StrataError, StrataResult};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A type-erased interceptor.
pub type BoxedInterceptor = Arc<dyn Interceptor>;

/// The phases a request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The context exists but dispatch has not started.
    Accepted = 0,
    /// Global pre-processing.
    Global = 1,
    /// Route resolution.
    Routing = 2,
    /// Route-scoped pre-processing.
    Scoped = 3,
    /// Interceptors and the handler.
    Interception = 4,
    /// Response projection.
    Projection = 5,
    /// The outcome has been handed back.
    Emission = 6,
}

impl Phase {
    /// Returns the phase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Global => "global",
            Self::Routing => "routing",
            Self::Scoped => "scoped",
            Self::Interception => "interception",
            Self::Projection => "projection",
            Self::Emission => "emission",
        }
    }

    /// Returns all phases in order.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Accepted,
            Self::Global,
            Self::Routing,
            Self::Scoped,
            Self::Interception,
            Self::Projection,
            Self::Emission,
        ]
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage a route can name.
#[derive(Clone)]
enum NamedStage {
    Scoped(BoxedMiddleware),
    Interceptor(BoxedInterceptor),
}

/// The request pipeline.
///
/// Immutable once built; share it between connections with an `Arc`.
///
/// # Example
///
/// ```
/// use strata_middleware::{Pipeline, SchemaRegistry, VisibilitySchema};
/// use strata_middleware::stages::{LoggingInterceptor, RequestIdMiddleware, RequestLogger};
///
/// let pipeline = Pipeline::builder()
///     .global(RequestIdMiddleware::new())
///     .global(RequestLogger::global())
///     .scoped(RequestLogger::scoped())
///     .interceptor(LoggingInterceptor::new())
///     .schemas(SchemaRegistry::new().register("item", VisibilitySchema::new().visible("id")))
///     .build();
///
/// assert!(pipeline.verify_route(&["request_logger", "logging"]).is_ok());
/// assert!(pipeline.verify_route(&["missing"]).is_err());
/// ```
pub struct Pipeline {
    /// Global middleware, run for every request in this order.
    global: Vec<BoxedMiddleware>,

    /// Scoped middleware and interceptors by name.
    named: HashMap<&'static str, NamedStage>,

    /// Visibility schemas applied to resource replies.
    schemas: SchemaRegistry,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let global: Vec<_> = self.global.iter().map(|m| m.name()).collect();
        let mut named: Vec<_> = self.named.keys().collect();
        named.sort();
        f.debug_struct("Pipeline")
            .field("global", &global)
            .field("named", &named)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Returns the names of the global stages in execution order.
    #[must_use]
    pub fn global_stages(&self) -> Vec<&'static str> {
        self.global.iter().map(|m| m.name()).collect()
    }

    /// Checks that every stage a route names is registered.
    ///
    /// Call this for each route at startup so wiring faults surface
    /// before the first request.
    pub fn verify_route(&self, stages: &[&str]) -> StrataResult<()> {
        match stages.iter().find(|name| !self.named.contains_key(**name)) {
            Some(unknown) => Err(StrataError::internal(format!(
                "route names unregistered stage '{unknown}'"
            ))),
            None => Ok(()),
        }
    }

    /// Runs a request through the pipeline.
    ///
    /// `ctx` carries the request id chosen by the global stages, and the
    /// operation id once routing succeeds, so the caller can render the
    /// outcome.
    pub async fn dispatch<R>(
        &self,
        ctx: &mut MiddlewareContext,
        resolver: &R,
        request: Request,
    ) -> Outcome
    where
        R: RouteResolver + ?Sized,
    {
        let (head, body) = request.into_parts();
        self.admit(ctx, &head).await?;
        self.resume(ctx, resolver, head, body).await
    }

    /// Runs the global stages over a request head.
    ///
    /// The body is not needed yet. On success the request may continue
    /// with [`resume`](Self::resume); on failure it is over, and `ctx`
    /// already holds whatever the stages that ran recorded.
    pub async fn admit(&self, ctx: &mut MiddlewareContext, head: &RequestHead) -> StrataResult<()> {
        ctx.set_target(head.method.clone(), head.uri.path().to_string());

        ctx.enter(Phase::Global);
        for middleware in &self.global {
            tracing::trace!(stage = middleware.name(), "global stage");
            middleware.process(ctx, head).await?;
        }
        Ok(())
    }

    /// Continues an admitted request from routing through emission.
    ///
    /// Fails with an internal error if `ctx` did not go through
    /// [`admit`](Self::admit) first.
    pub async fn resume<R>(
        &self,
        ctx: &mut MiddlewareContext,
        resolver: &R,
        head: RequestHead,
        body: Bytes,
    ) -> Outcome
    where
        R: RouteResolver + ?Sized,
    {
        if ctx.phase() != Phase::Global {
            return Err(StrataError::internal(format!(
                "request resumed from phase '{}' without admission",
                ctx.phase()
            )));
        }

        ctx.enter(Phase::Routing);
        let Some(route) = resolver.resolve(&head.method, head.uri.path()) else {
            tracing::debug!(
                request_id = %ctx.request_id(),
                method = %head.method,
                path = head.uri.path(),
                "no route matched"
            );
            return Err(StrataError::route_not_found(
                head.method.as_str(),
                head.uri.path(),
            ));
        };
        ctx.set_operation_id(route.operation_id.to_string());

        let mut scoped = Vec::new();
        let mut interceptors = Vec::new();
        for name in route.stages {
            match self.named.get(name) {
                Some(NamedStage::Scoped(middleware)) => scoped.push(middleware.as_ref()),
                Some(NamedStage::Interceptor(interceptor)) => {
                    interceptors.push(interceptor.as_ref());
                }
                None => {
                    tracing::error!(
                        operation_id = route.operation_id,
                        stage = name,
                        "route names unregistered stage"
                    );
                    return Err(StrataError::internal(format!(
                        "route '{}' names unregistered stage '{name}'",
                        route.operation_id
                    )));
                }
            }
        }

        ctx.enter(Phase::Scoped);
        for middleware in scoped {
            tracing::trace!(stage = middleware.name(), "scoped stage");
            middleware.process(ctx, &head).await?;
        }

        ctx.enter(Phase::Interception);
        let input = HandlerInput::new(route.params, body);
        let next = interceptors
            .into_iter()
            .rev()
            .fold(Next::handler(route.handler, input), |next, interceptor| {
                Next::new(interceptor, next)
            });
        let outcome = next.run(ctx).await;

        ctx.enter(Phase::Projection);
        let outcome = outcome.map(|reply| self.schemas.project_reply(reply));

        ctx.enter(Phase::Emission);
        outcome
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    global: Vec<BoxedMiddleware>,
    named: HashMap<&'static str, NamedStage>,
    schemas: SchemaRegistry,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a global middleware. Global stages run in the order added.
    #[must_use]
    pub fn global<M: Middleware>(mut self, middleware: M) -> Self {
        self.global.push(Arc::new(middleware));
        self
    }

    /// Registers a middleware that routes can name.
    ///
    /// Registering a second stage under the same name replaces the first.
    #[must_use]
    pub fn scoped<M: Middleware>(mut self, middleware: M) -> Self {
        self.named
            .insert(middleware.name(), NamedStage::Scoped(Arc::new(middleware)));
        self
    }

    /// Registers an interceptor that routes can name.
    #[must_use]
    pub fn interceptor<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.named.insert(
            interceptor.name(),
            NamedStage::Interceptor(Arc::new(interceptor)),
        );
        self
    }

    /// Sets the visibility schemas.
    #[must_use]
    pub fn schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            global: self.global,
            named: self.named,
            schemas: self.schemas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::{FnInterceptor, Settlement};
    use crate::middleware::FnMiddleware;
    use crate::projection::VisibilitySchema;
    use crate::route::ResolvedRoute;
    use http::Method;
    use parking_lot::Mutex;
    use strata_core::{Handler, Reply, Resource};

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(serde::Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Secretive {
        id: u64,
        internal_secret: &'static str,
    }

    impl Resource for Secretive {
        const KIND: &'static str = "secretive";
    }

    struct OneRoute {
        path: &'static str,
        stages: Vec<&'static str>,
        handler: Box<dyn Handler>,
    }

    impl RouteResolver for OneRoute {
        fn resolve(&self, method: &Method, path: &str) -> Option<ResolvedRoute<'_>> {
            (method == Method::GET && path == self.path).then(|| ResolvedRoute {
                operation_id: "op",
                handler: self.handler.as_ref(),
                stages: &self.stages,
                params: HashMap::new(),
            })
        }
    }

    fn logging_mw(name: &'static str, log: &Log) -> impl Middleware {
        let log = Arc::clone(log);
        FnMiddleware::new(
            name,
            move |_ctx: &mut MiddlewareContext, _head: &RequestHead| -> StrataResult<()> {
                log.lock().push(name.to_string());
                Ok(())
            },
        )
    }

    fn logging_ic(name: &'static str, log: &Log) -> impl Interceptor {
        let before = Arc::clone(log);
        let after = Arc::clone(log);
        FnInterceptor::new(
            name,
            move |_ctx: &MiddlewareContext| before.lock().push(format!("{name}:before")),
            move |_ctx: &MiddlewareContext, _s: &Settlement| after.lock().push(format!("{name}:after")),
        )
    }

    fn pipeline(log: &Log) -> Pipeline {
        Pipeline::builder()
            .global(logging_mw("global", log))
            .scoped(logging_mw("scoped", log))
            .interceptor(logging_ic("outer", log))
            .interceptor(logging_ic("inner", log))
            .schemas(SchemaRegistry::new().register(
                Secretive::KIND,
                VisibilitySchema::new().visible("id").hidden("internalSecret"),
            ))
            .build()
    }

    fn route(log: &Log, stages: Vec<&'static str>) -> OneRoute {
        let log = Arc::clone(log);
        OneRoute {
            path: "/thing",
            stages,
            handler: Box::new(move |_input: HandlerInput| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().push("handler".to_string());
                    Reply::resource(&Secretive {
                        id: 1,
                        internal_secret: "s",
                    })
                }
            }),
        }
    }

    fn get(path: &str) -> Request {
        http::Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_ordering() {
        let log: Log = Arc::default();
        let pipeline = pipeline(&log);
        let router = route(&log, vec!["scoped", "outer", "inner"]);

        let mut ctx = MiddlewareContext::new();
        let reply = pipeline.dispatch(&mut ctx, &router, get("/thing")).await.unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "global",
                "scoped",
                "outer:before",
                "inner:before",
                "handler",
                "inner:after",
                "outer:after",
            ]
        );
        assert_eq!(reply.body(), &serde_json::json!({"id": 1}));
        assert_eq!(ctx.operation_id(), Some("op"));
        assert_eq!(ctx.phase(), Phase::Emission);
    }

    #[tokio::test]
    async fn test_unmatched_request_seen_by_global_only() {
        let log: Log = Arc::default();
        let pipeline = pipeline(&log);
        let router = route(&log, vec!["scoped", "outer"]);

        let mut ctx = MiddlewareContext::new();
        let err = pipeline
            .dispatch(&mut ctx, &router, get("/elsewhere"))
            .await
            .unwrap_err();

        assert!(matches!(err, StrataError::RouteNotFound { .. }));
        assert_eq!(*log.lock(), vec!["global"]);
        assert!(ctx.operation_id().is_none());
        assert_eq!(ctx.phase(), Phase::Routing);
    }

    #[tokio::test]
    async fn test_route_without_stages_gets_global_only() {
        let log: Log = Arc::default();
        let pipeline = pipeline(&log);
        let router = route(&log, vec![]);

        let mut ctx = MiddlewareContext::new();
        pipeline.dispatch(&mut ctx, &router, get("/thing")).await.unwrap();

        assert_eq!(*log.lock(), vec!["global", "handler"]);
    }

    #[tokio::test]
    async fn test_rejecting_global_stage_stops_pipeline() {
        let log: Log = Arc::default();
        let pipeline = Pipeline::builder()
            .global(FnMiddleware::new(
                "deny",
                |_ctx: &mut MiddlewareContext, _head: &RequestHead| -> StrataResult<()> {
                    Err(StrataError::validation("denied"))
                },
            ))
            .build();
        let router = route(&log, vec![]);

        let mut ctx = MiddlewareContext::new();
        let err = pipeline
            .dispatch(&mut ctx, &router, get("/thing"))
            .await
            .unwrap_err();

        assert!(matches!(err, StrataError::Validation { .. }));
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_stage_is_internal_fault() {
        let log: Log = Arc::default();
        let pipeline = pipeline(&log);
        let router = route(&log, vec!["nope"]);

        assert!(pipeline.verify_route(&router.stages).is_err());

        let mut ctx = MiddlewareContext::new();
        let err = pipeline
            .dispatch(&mut ctx, &router, get("/thing"))
            .await
            .unwrap_err();
        assert!(matches!(err, StrataError::Internal { .. }));
        assert!(!log.lock().contains(&"handler".to_string()));
    }

    #[tokio::test]
    async fn test_admit_runs_global_stages_without_a_body() {
        let log: Log = Arc::default();
        let pipeline = pipeline(&log);
        let (head, _) = get("/thing").into_parts();

        let mut ctx = MiddlewareContext::new();
        pipeline.admit(&mut ctx, &head).await.unwrap();

        assert_eq!(*log.lock(), vec!["global"]);
        assert_eq!(ctx.phase(), Phase::Global);
        assert_eq!(ctx.path(), "/thing");
    }

    #[tokio::test]
    async fn test_resume_continues_an_admitted_request() {
        let log: Log = Arc::default();
        let pipeline = pipeline(&log);
        let router = route(&log, vec!["scoped"]);
        let (head, body) = get("/thing").into_parts();

        let mut ctx = MiddlewareContext::new();
        pipeline.admit(&mut ctx, &head).await.unwrap();
        pipeline.resume(&mut ctx, &router, head, body).await.unwrap();

        assert_eq!(*log.lock(), vec!["global", "scoped", "handler"]);
        assert_eq!(ctx.phase(), Phase::Emission);
    }

    #[tokio::test]
    async fn test_resume_without_admission_is_refused() {
        let log: Log = Arc::default();
        let pipeline = pipeline(&log);
        let router = route(&log, vec!["scoped"]);
        let (head, body) = get("/thing").into_parts();

        let mut ctx = MiddlewareContext::new();
        let err = pipeline.resume(&mut ctx, &router, head, body).await.unwrap_err();

        assert!(matches!(err, StrataError::Internal { .. }));
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_scoped_stages_follow_route_order_and_can_reject() {
        let log: Log = Arc::default();
        let deny_log = Arc::clone(&log);
        let pipeline = Pipeline::builder()
            .scoped(logging_mw("second", &log))
            .scoped(logging_mw("first", &log))
            .scoped(FnMiddleware::new(
                "deny",
                move |_ctx: &mut MiddlewareContext, _head: &RequestHead| -> StrataResult<()> {
                    deny_log.lock().push("deny".to_string());
                    Err(StrataError::validation("denied"))
                },
            ))
            .build();
        let router = route(&log, vec!["first", "second", "deny"]);

        let mut ctx = MiddlewareContext::new();
        let err = pipeline
            .dispatch(&mut ctx, &router, get("/thing"))
            .await
            .unwrap_err();

        assert!(matches!(err, StrataError::Validation { .. }));
        assert_eq!(*log.lock(), vec!["first", "second", "deny"]);
        assert_eq!(ctx.phase(), Phase::Scoped);
    }

    #[test]
    fn test_phase_names_are_ordered() {
        let names: Vec<_> = Phase::all().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec!["accepted", "global", "routing", "scoped", "interception", "projection", "emission"]
        );
    }

    #[test]
    fn test_global_stages_listed_in_order() {
        let log: Log = Arc::default();
        let pipeline = Pipeline::builder()
            .global(logging_mw("first", &log))
            .global(logging_mw("second", &log))
            .build();
        assert_eq!(pipeline.global_stages(), vec!["first", "second"]);
    }
}
