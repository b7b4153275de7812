//! Strata - entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use strata_config::ConfigLoader;
use strata_server::{App, Server};
use strata_store::ItemStore;

/// Configuration file read when `--config` is not given, if present.
const DEFAULT_CONFIG_FILE: &str = "strata.toml";

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-V" => {
                    println!("strata {}", strata_server::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Strata - in-memory item service

USAGE:
    strata [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    PORT                               Listen port (default: 3000)
    STRATA__SERVER__HOST               Listen address (default: 0.0.0.0)
    STRATA__SERVER__REQUEST_TIMEOUT_MS Request timeout in milliseconds (default: 30000)
    STRATA__SERVER__TRUST_REQUEST_ID   Adopt incoming x-request-id headers (default: false)
    STRATA__LOGGING__LEVEL             Log filter (default: info)
    STRATA__LOGGING__FORMAT            json or pretty (default: pretty)

A .env file in the working directory is read if present.
"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loader = ConfigLoader::new()
        .with_dotenv()?
        .with_env_prefix("STRATA")
        .with_port_var("PORT");
    let loader = match &args.config {
        Some(path) => loader.with_file(path)?,
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
    };
    let config = loader.load().context("invalid configuration")?;

    strata_telemetry::init_logging(&config.logging.to_log_config())
        .context("failed to initialise logging")?;
    strata_telemetry::describe_metrics();

    info!(version = strata_server::VERSION, "starting strata");

    let store = Arc::new(ItemStore::new());
    let app = App::new(store, config.server.trust_request_id)?
        .with_request_timeout(Duration::from_millis(config.server.request_timeout_ms));

    Server::new(app, config.socket_addr()?)
        .with_shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .run()
        .await?;

    info!("strata stopped");
    Ok(())
}
