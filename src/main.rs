//! Slack sweeper CLI - main entry point
//!
//! Usage:
//!   cargo run --bin slack_sweep              # Sweep all private channels
//!   cargo run --bin slack_sweep -- --config path/to/config.yml

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use slack_sweep::{commands, Config, SlackClient};

#[derive(Parser, Debug)]
#[command(name = "slack_sweep")]
#[command(about = "Clear statuspage messages from Slack")]
#[command(version)]
struct Args {
    /// Path to config.yml (defaults to config.yml in the current or parent directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match args.config {
        Some(path) => Config::load_from_file(&path).map_err(anyhow::Error::msg)?,
        None => Config::new(),
    };

    let client = SlackClient::new(config.token.as_str(), config.base_url.as_str())?;
    commands::sweep_run(&client, &config.bot_id).await?;

    Ok(())
}
