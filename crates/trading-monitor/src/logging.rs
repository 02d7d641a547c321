//! Logging setup.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber: console output plus an optional JSON log
/// file.
///
/// `RUST_LOG` overrides `level`. The returned guard flushes the file writer
/// and must be kept alive for the life of the process.
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }

    Ok(guard)
}

/// Install a file-only subscriber, for when the terminal belongs to the
/// dashboard.
pub fn setup_file_logging(level: &str, path: &Path) -> io::Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Ok(guard)
}
