//! Logging configuration using tracing

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("the log file path {} has no file name", .0.display())]
    NoFileName(PathBuf),

    #[error("failed to open the log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
}

/// Installs the global subscriber writing to stderr and optionally to a file.
///
/// The returned guard flushes the file writer when dropped and must be kept
/// alive for the lifetime of the program.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| LoggingError::NoFileName(path.to_path_buf()))?;
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
