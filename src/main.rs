//! hrnet - HR directory server
//!
//! Serves designation and employee records over the length-prefixed JSON
//! envelope protocol, one request per connection.

use clap::Parser;
use hrnet_core::HrDirectory;
use hrnet_server::{Config, HrHandler, Server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hrnet")]
#[command(about = "HR directory server")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, env = "HRNET_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Configuration problems are fatal before anything listens.
    let config = match Config::load_with_port(cli.config.as_deref(), cli.port) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    let server_config = config.server_config()?;

    tracing::info!("Starting hrnet server");
    tracing::info!("  Bind address: {}", server_config.bind_addr);
    tracing::info!("  Max connections: {}", server_config.max_connections);

    let directory = Arc::new(HrDirectory::new());
    let server = Arc::new(Server::new(server_config, HrHandler::new(directory)));

    // Spawn shutdown signal handler
    let shutdown_server = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping server...");
        shutdown_server.shutdown();
    });

    // Run server (blocks until shutdown)
    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
