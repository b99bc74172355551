//! Crowdwatch API server binary.
//!
//! Wires configuration, logging, and the seeded metrics store to the
//! TCP accept loop, then serves until the process receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `crowdwatch.yaml` (or `--config`)
//! 3. Initialize structured logging (tracing)
//! 4. Create and seed the metrics store
//! 5. Log the endpoint banner
//! 6. Bind and serve until Ctrl-C

mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crowdwatch_api::json::{SERVICE_NAME, SERVICE_VERSION};
use crowdwatch_api::router::ENDPOINTS;
use crowdwatch_api::{start_server, MetricsStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat, LoggingConfig, DEFAULT_CONFIG_PATH};
use crate::error::AppError;

/// Serve crowd-density metrics and staffing recommendations over HTTP.
#[derive(Debug, Parser)]
#[command(name = "crowdwatch-server", version, about)]
struct Cli {
    /// Path to the YAML configuration file. Defaults to `crowdwatch.yaml`
    /// in the working directory, falling back to built-in defaults when
    /// that file does not exist.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

/// Application entry point for the API server.
///
/// # Errors
///
/// Returns an error if configuration, logging, store seeding, or binding
/// fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse arguments.
    let cli = Cli::parse();

    // 2. Load configuration.
    let (config, source) = load_config(cli.config)?;

    // 3. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!(service = SERVICE_NAME, version = SERVICE_VERSION, "crowdwatch-server starting");
    info!(
        source = %source,
        host = %config.server.host,
        port = config.server.port,
        backlog = config.server.backlog,
        max_connections = config.server.max_connections,
        "Configuration loaded"
    );

    // 4. Create and seed the store before accepting any connection.
    let store = Arc::new(MetricsStore::new(config.store.to_store_config()));
    store.initialize().await?;
    info!(
        metrics = store.metric_count().await,
        recommendations = store.recommendation_count().await,
        "Metrics store initialized"
    );

    // 5. Endpoint banner.
    info!(port = config.server.port, "Starting API server");
    for (method, path) in ENDPOINTS {
        info!("  {method} {path}");
    }

    // 6. Serve until Ctrl-C.
    let server_config = config.server.to_server_config();
    tokio::select! {
        result = start_server(&server_config, store) => result?,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C, shutting down"),
        },
    }

    Ok(())
}

/// Load configuration from the given path, the default path, or defaults.
///
/// Returns the configuration and a description of where it came from.
fn load_config(explicit: Option<PathBuf>) -> Result<(AppConfig, String), AppError> {
    if let Some(path) = explicit {
        let config = AppConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = AppConfig::from_file(&default_path)?;
        Ok((config, default_path.display().to_string()))
    } else {
        Ok((AppConfig::from_env_defaults()?, String::from("built-in defaults")))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| AppError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}
