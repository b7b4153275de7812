//! # Strata Server
//!
//! HTTP transport and routes for the Strata item service.
//!
//! - [`RouteTable`] - method and path to handler, with route groups
//! - [`App`] - the pipeline and routes, driven one request at a time
//! - [`Server`] - hyper HTTP/1 accept loop with graceful shutdown
//! - [`render`] - outcome to JSON response
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strata_server::{App, Server};
//! use strata_store::ItemStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::new(Arc::new(ItemStore::new()), false)?;
//!     Server::new(app, "127.0.0.1:3000".parse()?).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/strata-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;
pub mod render;
mod router;
pub mod routes;
mod server;
mod shutdown;

pub use app::App;
pub use error::ServerError;
pub use render::{render, HttpResponse};
pub use router::{RouteGroup, RouteTable};
pub use server::Server;
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};

/// The crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
