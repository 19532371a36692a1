// stowage/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use stowage_core::infrastructure::config::load_dotenv;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug stowage ingest ... to see the details.
    // Logs go to stderr; stdout carries the command output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // 2. .env next to the working directory, before any config is read
    load_dotenv();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            config_dir,
            config,
            target,
        } => commands::ingest::execute(config_dir, config, target.map(Into::into)).await?,
        Commands::Count(args) => commands::count::execute(args).await?,
    }

    Ok(())
}
