use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

/// Must be held for the lifetime of the process or buffered file logs are lost.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// `RUST_LOG` when set, otherwise the configured level.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Console plus a daily-rotated file keeping `backups` old files.
pub fn init(config: &LogConfig) -> anyhow::Result<LogGuard> {
    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("cannot create log dir {}", config.dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file.as_str())
        .max_log_files(config.backups + 1)
        .build(&config.dir)
        .context("cannot open log file")?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let console_layer = fmt::layer().with_target(false).with_filter(filter(&config.level));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter(&config.level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("tracing already initialized")?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}
