use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "lyre.log";

/// Log to `<dir>/lyre.log`; the terminal belongs to the TUI.
///
/// The filter comes from `LYRE_LOG` (e.g. `LYRE_LOG=debug`), default
/// `info`. Keep the returned guard alive until shutdown so buffered lines
/// are flushed.
pub fn init(dir: &Path) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("LYRE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
