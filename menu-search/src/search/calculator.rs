//! Per-entry factor scoring
//!
//! This module computes the four factor scores of a single catalogue entry
//! against an enhanced query, the analyzer's verdict and the caller context.

use thiserror::Error;

use crate::analysis::QueryAnalysis;
use crate::models::{MenuEntry, UserContext};

use super::enhancer::EnhancedQuery;
use super::scoring::FactorScores;

/// Score given to the temporal and user-context factors when nothing matches
pub const NEUTRAL_SCORE: f32 = 0.5;

/// Errors raised while scoring one entry
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    /// The entry violates catalogue invariants
    #[error("Entry {id} cannot be scored: {reason}")]
    InvalidEntry { id: String, reason: String },

    /// The analyzer produced something unusable
    #[error("Invalid query analysis: {0}")]
    InvalidAnalysis(String),
}

/// Everything the engine needs besides the entry itself
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub query: &'a EnhancedQuery,
    pub analysis: &'a QueryAnalysis,
    pub user: Option<&'a UserContext>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(query: &'a EnhancedQuery, analysis: &'a QueryAnalysis) -> Self {
        Self {
            query,
            analysis,
            user: None,
        }
    }

    pub fn with_user(mut self, user: Option<&'a UserContext>) -> Self {
        self.user = user;
        self
    }
}

/// Stateless calculator for the four ranking factors
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score an entry on all four factors; every score lies in [0, 1]
    pub fn score(
        &self,
        entry: &MenuEntry,
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScores, ScoringError> {
        if entry.keywords.is_empty() {
            return Err(ScoringError::InvalidEntry {
                id: entry.id.clone(),
                reason: "entry has no keywords".to_string(),
            });
        }

        Ok(FactorScores {
            keyword_match: self.keyword_match(entry, ctx.query),
            semantic_similarity: self.semantic_similarity(ctx.analysis)?,
            temporal_relevance: self.temporal_relevance(entry, ctx.user),
            user_context: self.user_context(entry, ctx.user),
        })
    }

    /// Fraction of enhanced terms found in the entry's name and description
    pub fn keyword_match(&self, entry: &MenuEntry, query: &EnhancedQuery) -> f32 {
        let terms = &query.enhanced_terms;
        if terms.is_empty() {
            return 0.0;
        }

        let text = entry.searchable_text();
        let matches = terms
            .iter()
            .filter(|term| text.contains(&term.to_lowercase()))
            .count();
        matches as f32 / terms.len() as f32
    }

    /// The analyzer's confidence, clamped into [0, 1]
    pub fn semantic_similarity(&self, analysis: &QueryAnalysis) -> Result<f32, ScoringError> {
        if !analysis.confidence.is_finite() {
            return Err(ScoringError::InvalidAnalysis(format!(
                "confidence is not finite: {}",
                analysis.confidence
            )));
        }
        Ok(analysis.confidence.clamp(0.0, 1.0))
    }

    /// 1.0 when the user's current semester is the entry's semester
    pub fn temporal_relevance(&self, entry: &MenuEntry, user: Option<&UserContext>) -> f32 {
        let current = user.and_then(|u| u.current_semester.as_deref());
        match (current, entry.semester.as_deref()) {
            (Some(current), Some(semester)) if current == semester => 1.0,
            _ => NEUTRAL_SCORE,
        }
    }

    /// 0.5 plus 0.25 for each of course and exam type that matches
    pub fn user_context(&self, entry: &MenuEntry, user: Option<&UserContext>) -> f32 {
        let Some(user) = user else {
            return NEUTRAL_SCORE;
        };

        let mut score = NEUTRAL_SCORE;
        if both_equal(user.course.as_deref(), entry.course.as_deref()) {
            score += 0.25;
        }
        if both_equal(user.exam_type.as_deref(), entry.exam_type.as_deref()) {
            score += 0.25;
        }
        score.min(1.0)
    }
}

// Absent values never match, not even each other.
fn both_equal(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}
