//! Configuration model definitions.
//!
//! This module contains the configuration structures for all menu-search components.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::search::RankingWeights;

/// Main configuration structure for menu-search.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MenuSearchConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Adaptive ranking configuration
    pub ranking: RankingConfig,

    /// Query enhancement configuration
    pub enhancer: EnhancerConfig,

    /// Search behaviour configuration
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Configuration for the catalogue, weights and feedback files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for storage
    pub data_dir: PathBuf,

    /// Catalogue file name (relative to data_dir)
    pub catalogue_file: String,

    /// Weights file name (relative to data_dir)
    pub weights_file: String,

    /// Buffered feedback file name (relative to data_dir)
    pub feedback_file: String,

    /// How long a cached catalogue snapshot is served before a reload
    #[serde(with = "humantime_serde")]
    pub staleness: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = directories::ProjectDirs::from("org", "menu-search", "menu-search")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"));

        Self {
            data_dir,
            catalogue_file: "menus.json".to_string(),
            weights_file: "ranking_weights.json".to_string(),
            feedback_file: "feedback.json".to_string(),
            staleness: Duration::from_secs(300),
        }
    }
}

impl StorageConfig {
    /// Storage rooted at `data_dir` with default file names
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Full path of the catalogue file
    pub fn catalogue_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalogue_file)
    }

    /// Full path of the weights file
    pub fn weights_path(&self) -> PathBuf {
        self.data_dir.join(&self.weights_file)
    }

    /// Full path of the buffered feedback file
    pub fn feedback_path(&self) -> PathBuf {
        self.data_dir.join(&self.feedback_file)
    }
}

/// Configuration for the adaptive ranker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingConfig {
    /// Feedback records collected before the weights are updated
    pub feedback_batch_size: usize,

    /// Weights used when no weights file exists
    pub initial_weights: RankingWeights,

    /// Whether updated weights and the pending feedback buffer are written
    /// to disk
    pub persist_weights: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            feedback_batch_size: 100,
            initial_weights: RankingWeights::default(),
            persist_weights: true,
        }
    }
}

/// Configuration for query enhancement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnhancerConfig {
    /// Longest accepted query, in characters
    pub max_query_length: usize,

    /// Replacement expansion table; the built-in table is used when unset
    pub expansions: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            max_query_length: 1000,
            expansions: None,
        }
    }
}

/// Configuration for result shaping and the similarity path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of ranked results returned
    pub max_results: usize,

    /// Neighbours requested from the similarity collaborator
    pub similarity_top_k: usize,

    /// Similarity below which neighbours are dropped
    pub similarity_threshold: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            similarity_top_k: 3,
            similarity_threshold: 0.5,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
