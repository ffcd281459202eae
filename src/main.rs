mod api;
mod auth;
mod cache;
mod cli;
mod config;
mod logging;
mod query;
mod transform;

use clap::Parser;
use color_eyre::Result;

use crate::cache::SessionEpoch;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // Captured before anything is read from the cache
  let epoch = SessionEpoch::now();

  let args = cli::Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  let _log_guard = logging::init()?;
  tracing::info!(base_url = %config.api.base_url, "Starting vambe-dash");

  let ctx = cli::Context::build(&config, epoch)?;
  cli::run(args.command, &ctx).await
}
