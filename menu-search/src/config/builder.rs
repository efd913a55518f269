//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use crate::search::RankingWeights;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder for creating MenuSearchConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: MenuSearchConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: MenuSearchConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: MenuSearchConfig) -> Self {
        Self { config }
    }

    /// Set the base data directory.
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the catalogue file name.
    pub fn with_catalogue_file(mut self, name: impl Into<String>) -> Self {
        self.config.storage.catalogue_file = name.into();
        self
    }

    /// Set the weights file name.
    pub fn with_weights_file(mut self, name: impl Into<String>) -> Self {
        self.config.storage.weights_file = name.into();
        self
    }

    /// Set the buffered feedback file name.
    pub fn with_feedback_file(mut self, name: impl Into<String>) -> Self {
        self.config.storage.feedback_file = name.into();
        self
    }

    /// Set how long a catalogue snapshot is served before reloading.
    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.config.storage.staleness = staleness;
        self
    }

    /// Set the number of feedback records per weight update.
    pub fn with_feedback_batch_size(mut self, size: usize) -> Self {
        self.config.ranking.feedback_batch_size = size;
        self
    }

    /// Set the weights used when none are persisted.
    pub fn with_initial_weights(mut self, weights: RankingWeights) -> Self {
        self.config.ranking.initial_weights = weights;
        self
    }

    /// Enable or disable persisting updated weights.
    pub fn with_weight_persistence(mut self, enabled: bool) -> Self {
        self.config.ranking.persist_weights = enabled;
        self
    }

    /// Set the longest accepted query.
    pub fn with_max_query_length(mut self, max: usize) -> Self {
        self.config.enhancer.max_query_length = max;
        self
    }

    /// Replace the query expansion table.
    pub fn with_expansions(mut self, table: BTreeMap<String, Vec<String>>) -> Self {
        self.config.enhancer.expansions = Some(table);
        self
    }

    /// Set the maximum number of ranked results.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.config.search.max_results = max;
        self
    }

    /// Configure the similarity path.
    pub fn with_similarity(mut self, top_k: usize, threshold: f32) -> Self {
        self.config.search.similarity_top_k = top_k;
        self.config.search.similarity_threshold = threshold;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Create a configuration for development.
    ///
    /// Data lives in `./data`, the cache is refreshed every few seconds and
    /// logging is at debug level.
    pub fn development() -> Self {
        Self::new()
            .with_data_dir(PathBuf::from("./data"))
            .with_staleness(Duration::from_secs(5))
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a configuration for testing.
    ///
    /// The cache never goes stale on its own, weights are not persisted and
    /// only warnings are logged.
    pub fn testing() -> Self {
        Self::new()
            .with_data_dir(PathBuf::from("./test_data"))
            .with_staleness(Duration::from_secs(3600))
            .with_weight_persistence(false)
            .with_log_level(LogLevel::Warn)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<MenuSearchConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
