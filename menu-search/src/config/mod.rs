//! Configuration system for menu-search.
//!
//! This module provides a flexible configuration system that supports loading
//! configuration from multiple sources (files, environment variables, etc.)
//! with proper validation and defaults.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "menu-search.toml",
    "menu-search.yaml",
    "menu-search.yml",
    "menu-search.json",
    ".menu-search/config.toml",
    ".menu-search/config.yaml",
    ".menu-search/config.yml",
    ".menu-search/config.json",
];

/// Environment variable prefix for menu-search configuration.
///
/// Nested keys are separated by a double underscore, e.g.
/// `MENU_SEARCH_STORAGE__DATA_DIR`.
pub const ENV_PREFIX: &str = "MENU_SEARCH_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during environment loading
    #[error("Failed to load environment variables: {0}")]
    EnvLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),

    /// General error
    #[error("{0}")]
    Other(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
