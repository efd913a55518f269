//! Logging setup for menu-search.
//!
//! Installs a global `tracing` subscriber from [`LoggingConfig`]. `RUST_LOG`
//! takes precedence over the configured level when it is set.

use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

use crate::config::{LogFormat, LogLevel, LoggingConfig};

#[cfg(test)]
mod tests;

/// Errors that can occur during logging setup
#[derive(Debug)]
pub enum LogError {
    /// I/O error while preparing the log file
    IoError(std::io::Error),

    /// Invalid log level
    InvalidLogLevel(String),

    /// The subscriber could not be installed
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "I/O error: {}", e),
            LogError::InvalidLogLevel(level) => write!(f, "Invalid log level: {}", level),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
        }
    }
}

impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

/// Keeps the background file writer alive; dropping it flushes and stops it.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize logging with the given configuration.
///
/// Returns `Ok(None)` when a global subscriber is already installed, which
/// keeps repeated initialization (tests, embedding applications) harmless.
pub fn init(config: &LoggingConfig) -> Result<Option<LogGuard>, LogError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let (file_writer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = create_non_blocking_file(path)?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let writer = match (file_writer, config.stdout) {
        (Some(file), true) => BoxMakeWriter::new(std::io::stdout.and(file)),
        (Some(file), false) => BoxMakeWriter::new(file),
        (None, true) => BoxMakeWriter::new(std::io::stdout),
        (None, false) => BoxMakeWriter::new(std::io::sink),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_ansi(config.file.is_none() && config.stdout);

    match config.format {
        LogFormat::Json => builder.json().try_init()?,
        LogFormat::Compact => builder.compact().try_init()?,
        LogFormat::Pretty => builder.pretty().try_init()?,
        LogFormat::Default => builder.try_init()?,
    }

    tracing::debug!(
        "Logging initialized at {} ({:?})",
        config.level,
        config.format
    );

    Ok(Some(LogGuard { _file: guard }))
}

/// Open `path` for appending and wrap it in a non-blocking writer
pub fn create_non_blocking_file(path: &Path) -> Result<(NonBlocking, WorkerGuard), LogError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_appender::non_blocking(file))
}

/// Parse a level name into a `tracing::Level`
pub fn parse_log_level(level: &str) -> Result<Level, LogError> {
    let level: LogLevel = level
        .parse()
        .map_err(|_| LogError::InvalidLogLevel(level.to_string()))?;
    Ok(log_level_to_level(level))
}

pub fn log_level_to_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        _ => LogLevel::Error,
    }
}
