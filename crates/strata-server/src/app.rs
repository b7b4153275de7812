//! The assembled application.
//!
//! [`App`] pairs a [`Pipeline`] with a [`RouteTable`] and turns a request
//! into a rendered response. The body may still be in flight: the global
//! stages run on the head, then the body is awaited. It knows nothing
//! about sockets, so tests drive it directly.

use crate::error::ServerError;
use crate::render::{render, HttpResponse};
use crate::router::RouteTable;
use crate::routes;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use strata_core::{Outcome, StrataError, StrataResult};
use strata_middleware::stages::{LoggingInterceptor, RequestIdMiddleware, RequestLogger};
use strata_middleware::{MiddlewareContext, Pipeline, Request, RequestHead};
use strata_store::ItemStore;
use tokio::time::{timeout_at, Instant};

/// Pipeline plus routes.
#[derive(Debug)]
pub struct App {
    pipeline: Pipeline,
    routes: RouteTable,
    request_timeout: Option<Duration>,
}

impl App {
    /// Builds the item service over the given store.
    ///
    /// Every request gets a request id and the global request log. Item
    /// routes add the route-scoped request log and the logging
    /// interceptor, and their records are projected through the item
    /// schema.
    pub fn new(store: Arc<ItemStore>, trust_request_id: bool) -> Result<Self, ServerError> {
        let pipeline = Pipeline::builder()
            .global(RequestIdMiddleware::with_trust(trust_request_id))
            .global(RequestLogger::global())
            .scoped(RequestLogger::scoped())
            .interceptor(LoggingInterceptor::new())
            .schemas(routes::schemas())
            .build();

        Self::from_parts(pipeline, routes::table(&store))
    }

    /// Pairs an arbitrary pipeline with a route table.
    ///
    /// Fails if any route names a stage the pipeline does not register.
    pub fn from_parts(pipeline: Pipeline, routes: RouteTable) -> Result<Self, ServerError> {
        for (operation_id, stages) in routes.stage_lists() {
            pipeline.verify_route(stages).map_err(|e| {
                tracing::error!(operation_id, error = %e, "route wiring rejected");
                ServerError::Wiring(e)
            })?;
        }

        tracing::debug!(routes = routes.len(), global = ?pipeline.global_stages(), "application assembled");
        Ok(Self {
            pipeline,
            routes,
            request_timeout: None,
        })
    }

    /// Bounds the time a request may take, body included.
    ///
    /// A body that does not arrive in time is answered with
    /// `408 REQUEST_TIMEOUT`. A request that runs out of time after that
    /// is answered with an internal error, and interceptor after-logic
    /// still runs for it.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Handles one request whose body is already collected.
    pub async fn handle(&self, request: Request) -> HttpResponse {
        let (head, body) = request.into_parts();
        self.handle_streaming(head, std::future::ready(Ok(body))).await
    }

    /// Handles one request whose body is still being received.
    ///
    /// `body` is awaited only after the global stages have run, so a body
    /// that fails or stalls is still answered with the request id they
    /// chose.
    pub async fn handle_streaming<F>(&self, head: RequestHead, body: F) -> HttpResponse
    where
        F: Future<Output = StrataResult<Bytes>> + Send,
    {
        let mut ctx = MiddlewareContext::new();
        let outcome = self.process(&mut ctx, head, body).await;

        if outcome.is_err() {
            tracing::debug!(
                request_id = %ctx.request_id(),
                http.method = %ctx.method(),
                http.path = ctx.path(),
                phase = ctx.phase().name(),
                "request ended with an error"
            );
        }

        render(outcome, ctx.request_id())
    }

    async fn process<F>(&self, ctx: &mut MiddlewareContext, head: RequestHead, body: F) -> Outcome
    where
        F: Future<Output = StrataResult<Bytes>> + Send,
    {
        let Some(limit) = self.request_timeout else {
            self.pipeline.admit(ctx, &head).await?;
            let body = body.await?;
            return self.pipeline.resume(ctx, &self.routes, head, body).await;
        };

        let deadline = Instant::now() + limit;
        let exceeded = || StrataError::internal(format!("request exceeded {}ms", limit.as_millis()));

        timeout_at(deadline, self.pipeline.admit(ctx, &head))
            .await
            .unwrap_or_else(|_| Err(exceeded()))?;

        let body = timeout_at(deadline, body).await.unwrap_or_else(|_| {
            tracing::warn!(
                request_id = %ctx.request_id(),
                http.path = ctx.path(),
                "request body collection timed out"
            );
            Err(StrataError::timeout(format!(
                "request body not received within {}ms",
                limit.as_millis()
            )))
        })?;

        timeout_at(deadline, self.pipeline.resume(ctx, &self.routes, head, body))
            .await
            .unwrap_or_else(|_| Err(exceeded()))
    }
}
