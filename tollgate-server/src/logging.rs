use crate::config::LogFormat;
use anyhow::{anyhow, Context};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber: stdout always, plus `log_file` when given.
///
/// The returned guard flushes the file writer on drop; hold it for the life
/// of the process.
pub fn init_logging(format: LogFormat, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_writer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => {
            let stdout_layer = fmt::layer().json().with_target(true);
            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(writer)
                    .with_ansi(false)
            });
            registry.with(stdout_layer).with(file_layer).try_init()
        }
        LogFormat::Text => {
            let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .with_target(false)
                    .with_writer(writer)
                    .with_ansi(false)
            });
            registry.with(stdout_layer).with(file_layer).try_init()
        }
    };
    installed.context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn file_writer(path: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log file path has no file name: {}", path.display()))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    Ok(tracing_appender::non_blocking(
        tracing_appender::rolling::never(directory, file_name),
    ))
}
