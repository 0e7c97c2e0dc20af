mod auth;
mod cli;
mod config;
mod error;
mod github;
mod notifier;
mod pipeline;
mod secrets;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting pipeline notifier");
    cli.execute().await?;

    Ok(())
}
