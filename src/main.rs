use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use agora::{Config, Database, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = agora::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        agora::logging::init_console_only(&config.logging.level);
    }

    info!("Agora - discussion forum backend");

    let db = match Database::open(&config.database.path, config.database.max_connections).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!(path = %config.database.path, error = %e, "Failed to open database");
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::from_config(&config, db) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to configure web server");
            return ExitCode::FAILURE;
        }
    };

    info!("Server configured on {}", server.addr());

    if let Err(e) = server.run().await {
        error!(error = %e, "Web server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
