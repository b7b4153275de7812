//! Server error types.

use std::net::SocketAddr;
use strata_config::ConfigError;
use strata_core::StrataError;
use thiserror::Error;

/// Errors raised while wiring or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A route names a stage the pipeline does not provide.
    #[error("invalid pipeline wiring: {0}")]
    Wiring(#[source] StrataError),
}
