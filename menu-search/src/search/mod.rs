//! Multi-factor search scoring
//!
//! This module turns a free-text query into a ranked list of catalogue
//! entries. Four factors are scored per entry:
//! - keyword match against the entry's name and description
//! - semantic similarity (the analyzer's confidence)
//! - temporal relevance (semester match)
//! - user context (course and exam type match)
//!
//! The [`AdaptiveRanker`] combines them with a weight vector that it adapts
//! from user selections. A simpler, weight-free [`PhraseMatcher`] scores
//! entries by the search hints stored on the entries themselves.
//!
//! # Example
//!
//! ```no_run
//! use menu_search::analysis::QueryAnalysis;
//! use menu_search::models::MenuEntry;
//! use menu_search::search::{AdaptiveRanker, QueryEnhancer, ScoringContext};
//!
//! let enhancer = QueryEnhancer::new();
//! let query = enhancer.enhance("exam marks", None).unwrap();
//! let analysis = QueryAnalysis::degraded();
//!
//! let entries = vec![
//!     MenuEntry::builder("grade-card", "Grade Card")
//!         .description("Semester grade card")
//!         .keyword("grade")
//!         .build(),
//! ];
//!
//! let ranker = AdaptiveRanker::new();
//! let ranked = ranker.rank_results(entries, &ScoringContext::new(&query, &analysis));
//! ```

pub mod calculator;
pub mod enhancer;
pub mod phrase;
pub mod ranker;
pub mod scoring;

pub use calculator::{ScoringContext, ScoringEngine, ScoringError};
pub use enhancer::{EnhancedQuery, EnhancementError, ExtractedContext, QueryEnhancer};
pub use phrase::{PhraseMatch, PhraseMatcher};
pub use ranker::{AdaptiveRanker, FeedbackRecord, RankerSnapshot, ScoredEntry};
pub use scoring::{Factor, FactorScores, RankingWeights};
