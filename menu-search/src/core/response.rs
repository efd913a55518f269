//! Result types returned by the search pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalyzerError, QueryType};
use crate::models::MenuEntry;
use crate::search::{
    EnhancementError, ExtractedContext, FactorScores, RankingWeights, ScoredEntry, ScoringError,
};
use crate::storage::StorageError;

/// Errors surfaced by pipeline operations other than `search`
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error(transparent)]
    Enhancement(#[from] EnhancementError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error("No similarity search backend configured")]
    SimilarityUnavailable,

    #[error("Search panicked: {0}")]
    Panic(String),
}

/// Everything known about how a search was answered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseMetadata {
    pub original_query: String,
    pub enhanced_terms: Vec<String>,
    pub semantic_variations: Vec<String>,
    pub extracted_context: ExtractedContext,

    /// Analyzer intent; empty when the analyzer was unavailable
    pub intent: String,
    pub confidence: f32,
    pub query_type: QueryType,

    /// Active entries considered before truncation
    pub candidate_count: usize,
    pub result_count: usize,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,

    /// Recovered problems (analyzer down, enhancement skipped)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Set when the search could not be answered; results are then empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseMetadata {
    pub fn new(query: &str) -> Self {
        Self {
            original_query: query.to_string(),
            enhanced_terms: Vec::new(),
            semantic_variations: Vec::new(),
            extracted_context: ExtractedContext::default(),
            intent: String::new(),
            confidence: crate::analysis::DEFAULT_CONFIDENCE,
            query_type: QueryType::default(),
            candidate_count: 0,
            result_count: 0,
            elapsed_ms: 0,
            timestamp: Utc::now(),
            warnings: Vec::new(),
            error: None,
        }
    }
}

/// Ranked results plus metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<ScoredEntry>,
    pub metadata: ResponseMetadata,
}

impl SearchResponse {
    pub fn is_error(&self) -> bool {
        self.metadata.error.is_some()
    }
}

/// What happened to a recorded selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackOutcome {
    pub entry_id: String,

    /// Factor scores of the selected entry for this query
    pub factors: FactorScores,

    /// Records still buffered after this call
    pub pending: usize,

    /// New weights, when this call completed a batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_weights: Option<RankingWeights>,

    /// Whether the new weights reached disk
    pub weights_persisted: bool,
}

/// A neighbour returned by the similarity path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarEntry {
    pub entry: MenuEntry,
    pub similarity: f32,
}
