//! External analysis collaborators.
//!
//! The pipeline consumes two capabilities it does not implement itself: an
//! intent analyzer that reports a confidence for a query, and an optional
//! nearest-neighbour retriever backed by embeddings. Both are traits so that
//! any classifier or vector index can be plugged in.
//!
//! # Examples
//!
//! ```no_run
//! use async_trait::async_trait;
//! use menu_search::analysis::{AnalyzerError, QueryAnalysis, QueryAnalyzer};
//!
//! #[derive(Debug)]
//! struct FixedAnalyzer;
//!
//! #[async_trait]
//! impl QueryAnalyzer for FixedAnalyzer {
//!     async fn analyze(&self, _query: &str) -> Result<QueryAnalysis, AnalyzerError> {
//!         Ok(QueryAnalysis::new("results", 0.9))
//!     }
//! }
//! ```

mod keyword;

pub use keyword::KeywordAnalyzer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence substituted when no analysis is available
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Error reported by an external collaborator
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzerError {
    /// The collaborator could not be reached or is not loaded
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with something unusable
    #[error("Invalid analyzer response: {0}")]
    InvalidResponse(String),
}

/// Coarse shape of a query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// "how do I ...", "what is ..."
    Question,
    /// "find ...", "need ..."
    Search,
    /// Anything else
    #[default]
    Statement,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question => write!(f, "question"),
            Self::Search => write!(f, "search"),
            Self::Statement => write!(f, "statement"),
        }
    }
}

/// Result of analyzing a query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryAnalysis {
    /// Detected intent label; empty when unknown
    pub intent: String,

    /// Confidence in the intent, in [0, 1]
    pub confidence: f32,

    /// Academic topic groups mentioned by the query
    #[serde(default)]
    pub academic_context: Vec<String>,

    /// Shape of the query
    #[serde(default)]
    pub query_type: QueryType,
}

impl QueryAnalysis {
    pub fn new(intent: impl Into<String>, confidence: f32) -> Self {
        Self {
            intent: intent.into(),
            confidence,
            academic_context: Vec::new(),
            query_type: QueryType::default(),
        }
    }

    /// Analysis used when the analyzer is unavailable: no intent, confidence 0.5
    pub fn degraded() -> Self {
        Self::new(String::new(), DEFAULT_CONFIDENCE)
    }
}

impl Default for QueryAnalysis {
    fn default() -> Self {
        Self::degraded()
    }
}

/// Intent analyzer collaborator
#[async_trait]
pub trait QueryAnalyzer: Send + Sync + fmt::Debug {
    /// Analyze a raw query
    async fn analyze(&self, query: &str) -> Result<QueryAnalysis, AnalyzerError>;
}

/// Embedding-backed nearest-neighbour retrieval collaborator
#[async_trait]
pub trait SimilaritySearch: Send + Sync + fmt::Debug {
    /// Return up to `k` `(entry_id, similarity)` pairs, best first
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(String, f32)>, AnalyzerError>;
}
