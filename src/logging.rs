use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to a daily log file so it never mixes with CLI output.
///
/// `RUST_LOG` wins over `default_filter`. Keep the returned guard alive for the
/// life of the program or buffered lines are lost on exit.
pub fn init(default_filter: &str) -> Result<WorkerGuard> {
  let dir = ProjectDirs::from("", "", "hubsearch")
    .map(|p| p.data_dir().join("logs"))
    .unwrap_or_else(|| std::env::temp_dir().join("hubsearch-logs"));
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;

  let appender = tracing_appender::rolling::daily(&dir, "hubsearch.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;
  Ok(guard)
}
