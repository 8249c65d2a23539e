//! Feed Cache CLI - inspect and maintain the locally cached feed
//!
//! Each invocation runs one cache operation against the configured store and
//! exits. Output goes to stdout, logs to stderr.

use std::io;

use clap::Parser;

use feedcache::app;
use feedcache::cli::Cli;
use feedcache::config::StoreConfig;
use feedcache::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = StoreConfig::from_cli(&cli)?;
    tracing::debug!(command = ?cli.command, path = %config.path.display(), "Starting");

    app::run(cli.command, &config, &mut io::stdout()).await?;

    Ok(())
}
