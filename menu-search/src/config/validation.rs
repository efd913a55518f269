//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration values.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &MenuSearchConfig) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_ranking_config(&config.ranking)?;
    validate_enhancer_config(&config.enhancer)?;
    validate_search_config(&config.search)?;
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

/// Validate storage configuration.
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.data_dir.as_os_str().is_empty() {
        return Err(invalid("Data directory cannot be empty"));
    }
    if config.catalogue_file.trim().is_empty() {
        return Err(invalid("Catalogue file name cannot be empty"));
    }
    if config.weights_file.trim().is_empty() {
        return Err(invalid("Weights file name cannot be empty"));
    }
    if config.feedback_file.trim().is_empty() {
        return Err(invalid("Feedback file name cannot be empty"));
    }
    if config.catalogue_file == config.weights_file
        || config.catalogue_file == config.feedback_file
        || config.weights_file == config.feedback_file
    {
        return Err(invalid(
            "Catalogue, weights and feedback files must be different files",
        ));
    }
    Ok(())
}

/// Validate ranking configuration.
fn validate_ranking_config(config: &RankingConfig) -> Result<(), ConfigError> {
    if config.feedback_batch_size == 0 {
        return Err(invalid("feedback_batch_size must be greater than 0"));
    }
    config
        .initial_weights
        .validate()
        .map_err(|e| invalid(format!("initial_weights: {}", e)))?;
    Ok(())
}

/// Validate enhancer configuration.
fn validate_enhancer_config(config: &EnhancerConfig) -> Result<(), ConfigError> {
    if config.max_query_length == 0 {
        return Err(invalid("max_query_length must be greater than 0"));
    }
    if let Some(table) = &config.expansions
        && table.keys().any(|k| k.trim().is_empty() || k.contains(char::is_whitespace))
    {
        return Err(invalid(
            "expansion keys must be single non-empty tokens",
        ));
    }
    Ok(())
}

/// Validate search configuration.
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_results == 0 {
        return Err(invalid("max_results must be greater than 0"));
    }
    if config.similarity_top_k == 0 {
        return Err(invalid("similarity_top_k must be greater than 0"));
    }
    if !(0.0..=1.0).contains(&config.similarity_threshold) {
        return Err(invalid("similarity_threshold must be between 0.0 and 1.0"));
    }
    Ok(())
}
