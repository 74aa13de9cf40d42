//! Floodgate - traffic governance for multi-agent AI systems.
//!
//! Buffers agent thoughts while the network is congested and synthesizes
//! the backlog into one coherent prompt once conditions normalize.

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod config;
mod core;
mod error;
mod logging;
mod store;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; the guard keeps the file appender alive.
    let _guard = match logging::init() {
        Ok((guard, _)) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
