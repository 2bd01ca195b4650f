//! Prize pool reserve monitor.
//!
//! This binary periodically fetches the prize pool state and prints how the
//! reserve accumulated and was drawn down over draws.

mod config;
mod error;
mod monitor;
mod output;

use clap::Parser;
use std::process::exit;
use tracing::error;
use url::Url;

use config::{CliConfig, EnvConfig};
use monitor::ReserveMonitor;

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = CliConfig::parse();

    let monitor_config = match cli_config.to_monitor_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            exit(1);
        }
    };

    // Set up logging, stdout is reserved for the series
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let chain = match env_config.chain() {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("Invalid chain configuration: {}", e);
            exit(1);
        }
    };

    let burn_token = match env_config.burn_token_address() {
        Ok(address) => address,
        Err(e) => {
            eprintln!("Invalid burn token address: {}", e);
            exit(1);
        }
    };

    // Parse RPC URL
    let node_url = match Url::parse(&env_config.node_rpc_url) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid RPC URL: {}", e);
            exit(1);
        }
    };

    let mut monitor = ReserveMonitor::new(
        node_url,
        chain,
        env_config.blocks_per_query(),
        burn_token,
        monitor_config,
    );

    if let Err(e) = monitor.run().await {
        error!(%e, "Reserve monitor encountered an error, shutting down");
        exit(1);
    }
}
