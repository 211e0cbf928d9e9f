//! RepDAO Node - command-line host for the governance state machine.
//!
//! Loads configuration, initializes logging, then runs one command against
//! the persisted governance state.

pub mod commands;
pub mod config;
pub mod snapshot;
pub mod telemetry;

use clap::Parser;
use tracing::{debug, error, info};

fn main() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();

    // Load or create config
    let mut config = match &cli.config {
        Some(path) => config::NodeConfig::from_file(path)?,
        None => config::NodeConfig::default(),
    };

    // Override with CLI args
    if let Some(state_file) = cli.state_file {
        config.state_file = state_file;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    config.validate()?;
    telemetry::init(&config.logging)?;

    match &cli.config {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => debug!("Using default configuration"),
    }
    debug!("Node: {}", config.name);
    debug!("State file: {:?}", config.state_file);
    debug!("Governance: {:?}", config.governance);

    if let Err(e) = commands::execute(cli.command, &config) {
        error!("Command failed: {}", e);
        return Err(e);
    }
    Ok(())
}
