use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chess_tutor::app;
use chess_tutor::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // stdout carries the game; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    app::run(config).await
}
