//! Pair Rotation Server
//!
//! Serves the roster and weekly pairings over HTTP until interrupted.

use clap::{Arg, ArgMatches, Command};
use pair_rotation::core::config::StorageType;
use pair_rotation::core::logging::init_logging;
use pair_rotation::{api, core::create_app_state, Config, Error, Result};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("pair-rotation")
        .version(pair_rotation::VERSION)
        .about("Weekly randomized pairings over HTTP.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address"),
        )
        .arg(
            Arg::new("data-file")
                .long("data-file")
                .value_name("PATH")
                .help("JSON document path"),
        )
        .arg(
            Arg::new("storage-type")
                .long("storage-type")
                .value_name("TYPE")
                .help("Storage backend type (json_file, memory)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Apply CLI overrides
    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    // Initialize logging
    if !init_logging(&config.logging) {
        warn!("Tracing subscriber already installed");
    }

    info!("Starting {} v{}", pair_rotation::NAME, pair_rotation::VERSION);

    let configured_app_state = create_app_state(config)?;
    api::start_server(configured_app_state, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr
            .parse()
            .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
    }

    if let Some(data_file) = matches.get_one::<String>("data-file") {
        config.storage.data_file = data_file.into();
    }

    if let Some(storage_type) = matches.get_one::<String>("storage-type") {
        config.storage.storage_type = storage_type.parse::<StorageType>()?;
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
