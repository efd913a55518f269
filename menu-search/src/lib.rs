//! # menu-search
//!
//! Adaptive natural-language search over a catalogue of academic-records menu
//! entries (result reports, revaluation and re-examination applications, fee
//! receipts). Queries such as "check my S5 marks" are expanded with
//! domain synonyms, scored on four factors and ranked with weights that adapt
//! to which entries users actually pick.
//!
//! ## Quick Start
//!
//! ```no_run
//! use menu_search::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::new().with_data_dir("./data").build()?;
//!     let pipeline = init(config).await?;
//!
//!     let response = pipeline.search("check my S5 marks", None).await;
//!     for hit in &response.results {
//!         println!("{:.3}  {}", hit.score, hit.entry.name);
//!     }
//!
//!     if let Some(best) = response.results.first() {
//!         pipeline
//!             .record_feedback("check my S5 marks", &best.entry.id, None)
//!             .await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **storage**: JSON catalogue and weights files behind a cached, lock-aware
//!   [`storage::EntryStore`]
//! - **search**: query enhancement, factor scoring, phrase matching and the
//!   feedback-driven [`search::AdaptiveRanker`]
//! - **analysis**: intent and similarity collaborators behind traits
//! - **core**: the [`core::SearchPipeline`] that ties them together
//!
//! Logging is not started by [`init`]; call [`logging::init`] and keep the
//! returned guard for as long as the process should log.

pub mod analysis;
pub mod config;
pub mod core;
pub mod logging;
pub mod models;
pub mod search;
pub mod storage;

use std::sync::Arc;

use tracing::{info, warn};

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{
        ConfigBuilder, ConfigLoader, LogFormat, LogLevel, MenuSearchConfig, SearchConfig,
        StorageConfig,
    };

    pub use crate::models::{MenuEntry, MenuEntryPatch, UserContext};

    pub use crate::analysis::{KeywordAnalyzer, QueryAnalysis, QueryAnalyzer, SimilaritySearch};

    pub use crate::search::{AdaptiveRanker, QueryEnhancer, RankingWeights, ScoredEntry};

    pub use crate::core::{FeedbackOutcome, SearchPipeline, SearchResponse};

    pub use crate::storage::{EntryStore, StorageError};

    pub use crate::{MenuSearchError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for menu-search operations
#[derive(Debug, thiserror::Error)]
pub enum MenuSearchError {
    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LogError),

    /// Error from a pipeline operation
    #[error(transparent)]
    Pipeline(#[from] core::PipelineError),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

/// Result type for menu-search operations
pub type Result<T> = std::result::Result<T, MenuSearchError>;

/// Initialize a search pipeline with configuration from the default sources
///
/// Defaults, then the first configuration file found, then `MENU_SEARCH_*`
/// environment variables.
pub async fn init_with_defaults() -> Result<core::SearchPipeline> {
    let mut loader = config::ConfigLoader::new();
    loader.load_default_files().load_env();
    init(loader.extract()?).await
}

/// Initialize a search pipeline with the provided configuration
///
/// Opens the catalogue store, restores persisted ranking weights (falling
/// back to `ranking.initial_weights`) and, when persistence is enabled, the
/// pending feedback buffer of the previous process. Wires the built-in
/// [`analysis::KeywordAnalyzer`] as the intent analyzer. The catalogue itself
/// is loaded lazily on the first search.
pub async fn init(config: config::MenuSearchConfig) -> Result<core::SearchPipeline> {
    config::validate_config(&config)?;

    let store = Arc::new(storage::EntryStore::open(&config.storage));

    let weights = match store.load_weights().await {
        Ok(Some(weights)) => {
            info!("Restored ranking weights from {}", store.weights_path().display());
            weights
        }
        Ok(None) => config.ranking.initial_weights,
        Err(e) => {
            warn!("Ignoring unreadable ranking weights: {}", e);
            config.ranking.initial_weights
        }
    };

    let ranker = search::AdaptiveRanker::with_weights(weights)
        .with_batch_size(config.ranking.feedback_batch_size);

    let pipeline = core::SearchPipeline::builder(store)
        .ranker(Arc::new(ranker))
        .enhancer(search::QueryEnhancer::from_config(&config.enhancer))
        .analyzer(Arc::new(analysis::KeywordAnalyzer::new()))
        .settings(config.search.clone())
        .persist_weights(config.ranking.persist_weights)
        .build();

    if config.ranking.persist_weights {
        match pipeline.restore_feedback().await {
            Ok(0) => {}
            Ok(count) => info!("Restored {} pending feedback records", count),
            Err(e) => warn!("Ignoring unreadable feedback buffer: {}", e),
        }
    }

    Ok(pipeline)
}
