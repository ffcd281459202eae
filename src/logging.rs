use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `VAMBE_DASH_LOG=vambe_dash=debug`.
pub const LOG_ENV: &str = "VAMBE_DASH_LOG";

/// Send logs to a daily file under the data dir, keeping stdout for output.
///
/// The returned guard flushes the writer on drop; hold it for the life of
/// the process.
pub fn init() -> Result<WorkerGuard> {
  let dir = crate::config::data_dir()?.join("logs");
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "vambe-dash.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
