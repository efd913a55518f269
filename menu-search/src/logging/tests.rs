use crate::config::{LogFormat, LogLevel, LoggingConfig};
use crate::logging::{
    LogError, create_non_blocking_file, level_to_log_level, log_level_to_level, parse_log_level,
};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_repeated_init_is_harmless() {
    let config = LoggingConfig {
        level: LogLevel::Debug,
        format: LogFormat::Compact,
        file: None,
        stdout: false,
    };

    assert!(crate::logging::init(&config).is_ok());
    // A second call finds the subscriber from the first one and backs off
    assert!(matches!(crate::logging::init(&config), Ok(None)));
}

#[test]
fn test_non_blocking_file_creates_parent_dirs() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("logs").join("nested").join("search.log");

    let (mut writer, guard) = create_non_blocking_file(&log_path).unwrap();
    writer.write_all(b"hello\n").unwrap();
    drop(guard);

    assert!(log_path.exists());
    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents, "hello\n");
}

#[test]
fn test_level_conversion() {
    assert_eq!(parse_log_level("trace").unwrap(), tracing::Level::TRACE);
    assert_eq!(parse_log_level("DEBUG").unwrap(), tracing::Level::DEBUG);
    assert_eq!(parse_log_level("info").unwrap(), tracing::Level::INFO);
    assert_eq!(parse_log_level("warning").unwrap(), tracing::Level::WARN);
    assert_eq!(parse_log_level("error").unwrap(), tracing::Level::ERROR);
    assert!(matches!(
        parse_log_level("invalid"),
        Err(LogError::InvalidLogLevel(level)) if level == "invalid"
    ));

    for level in [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ] {
        assert_eq!(level_to_log_level(log_level_to_level(level)), level);
    }
}
