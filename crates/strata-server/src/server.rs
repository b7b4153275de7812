//! HTTP server.
//!
//! Accepts TCP connections, serves each one with hyper's HTTP/1 connection
//! driver on its own task, and hands each request to the [`App`] while its body is still arriving.
//! On shutdown the accept loop stops, open connections are told to close,
//! and the server waits up to the shutdown timeout for them to finish.

use crate::app::App;
use crate::error::ServerError;
use crate::render::HttpResponse;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use strata_core::StrataError;
use strata_telemetry::InFlightGuard;
use tokio::net::{TcpListener, TcpStream};

/// Default time to wait for open connections on shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    app: Arc<App>,
    addr: SocketAddr,
    shutdown_timeout: Duration,
}

impl Server {
    /// Creates a server for `app` listening on `addr`.
    #[must_use]
    pub fn new(app: App, addr: SocketAddr) -> Self {
        Self {
            app: Arc::new(app),
            addr,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Sets how long shutdown waits for open connections.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Returns the configured listen address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.addr,
                source,
            })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local = listener.local_addr()?;
        tracing::info!(addr = %local, "server listening");

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let app = Arc::clone(&self.app);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(app, stream, shutdown).await {
                                tracing::warn!(remote = %remote, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                    }
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        tracing::info!(
            open = tracker.active_connections(),
            timeout_ms = u64::try_from(self.shutdown_timeout.as_millis()).unwrap_or(u64::MAX),
            "waiting for connections to close"
        );
        if tokio::time::timeout(self.shutdown_timeout, tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                open = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn serve_connection(
    app: Arc<App>,
    stream: TcpStream,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |request: Request<Incoming>| {
        let app = Arc::clone(&app);
        async move { Ok::<_, Infallible>(handle_request(&app, request).await) }
    });

    let connection = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(connection);

    tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.recv() => {
            // Finish the in-flight request, then close.
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    }
}

async fn handle_request(app: &App, request: Request<Incoming>) -> HttpResponse {
    let _in_flight = InFlightGuard::new();
    let (head, body) = request.into_parts();
    app.handle_streaming(head, collect_body(body)).await
}

async fn collect_body(body: Incoming) -> Result<Bytes, StrataError> {
    body.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| StrataError::validation(format!("failed to read request body: {e}")))
}
