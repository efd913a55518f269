//! Ranking factors and the adaptive weight vector
//!
//! Every entry is scored on four independent factors. The final relevance of
//! an entry is the weighted sum of its factor scores, using a
//! [`RankingWeights`] vector that the ranker adapts from user feedback.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when checking that weights sum to one
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

/// The four recognized ranking factors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Share of enhanced query terms found in the entry text
    KeywordMatch,

    /// Analyzer confidence, a stand-in for embedding similarity
    SemanticSimilarity,

    /// Whether the entry concerns the user's current semester
    TemporalRelevance,

    /// Whether the entry concerns the user's course and exam type
    UserContext,
}

impl Factor {
    /// All factors, in canonical order
    pub const ALL: [Factor; 4] = [
        Factor::KeywordMatch,
        Factor::SemanticSimilarity,
        Factor::TemporalRelevance,
        Factor::UserContext,
    ];

    /// Name used in persisted weights
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordMatch => "keyword_match",
            Self::SemanticSimilarity => "semantic_similarity",
            Self::TemporalRelevance => "temporal_relevance",
            Self::UserContext => "user_context",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-entry factor scores, each in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct FactorScores {
    pub keyword_match: f32,
    pub semantic_similarity: f32,
    pub temporal_relevance: f32,
    pub user_context: f32,
}

impl FactorScores {
    pub fn get(&self, factor: Factor) -> f32 {
        match factor {
            Factor::KeywordMatch => self.keyword_match,
            Factor::SemanticSimilarity => self.semantic_similarity,
            Factor::TemporalRelevance => self.temporal_relevance,
            Factor::UserContext => self.user_context,
        }
    }

    /// Whether every score lies in [0, 1]
    pub fn is_valid(&self) -> bool {
        Factor::ALL
            .iter()
            .all(|f| (0.0..=1.0).contains(&self.get(*f)))
    }
}

/// Weight vector over the four factors.
///
/// Invariant: every weight is finite and non-negative, and after any update
/// the weights sum to 1.0. Persisted as a JSON object keyed by factor name;
/// unknown keys are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RankingWeights {
    pub keyword_match: f32,
    pub semantic_similarity: f32,
    pub temporal_relevance: f32,
    pub user_context: f32,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            keyword_match: 0.3,
            semantic_similarity: 0.3,
            temporal_relevance: 0.2,
            user_context: 0.2,
        }
    }
}

impl RankingWeights {
    /// Create weights from raw values and normalize them
    pub fn new(
        keyword_match: f32,
        semantic_similarity: f32,
        temporal_relevance: f32,
        user_context: f32,
    ) -> Result<Self, String> {
        let mut weights = Self {
            keyword_match,
            semantic_similarity,
            temporal_relevance,
            user_context,
        };
        weights.check_components()?;
        if weights.sum() <= 0.0 {
            return Err("at least one weight must be positive".to_string());
        }
        weights.normalize();
        Ok(weights)
    }

    pub fn get(&self, factor: Factor) -> f32 {
        match factor {
            Factor::KeywordMatch => self.keyword_match,
            Factor::SemanticSimilarity => self.semantic_similarity,
            Factor::TemporalRelevance => self.temporal_relevance,
            Factor::UserContext => self.user_context,
        }
    }

    pub fn set(&mut self, factor: Factor, value: f32) {
        match factor {
            Factor::KeywordMatch => self.keyword_match = value,
            Factor::SemanticSimilarity => self.semantic_similarity = value,
            Factor::TemporalRelevance => self.temporal_relevance = value,
            Factor::UserContext => self.user_context = value,
        }
    }

    pub fn sum(&self) -> f32 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Scale the weights so they sum to 1.0; a zero vector is left alone
    pub fn normalize(&mut self) {
        let total = self.sum();
        if total > 0.0 {
            for factor in Factor::ALL {
                self.set(factor, self.get(factor) / total);
            }
        }
    }

    fn check_components(&self) -> Result<(), String> {
        for factor in Factor::ALL {
            let value = self.get(factor);
            if !value.is_finite() {
                return Err(format!("{} weight must be finite", factor));
            }
            if value < 0.0 {
                return Err(format!("{} weight must be >= 0.0", factor));
            }
        }
        Ok(())
    }

    /// Validate the weight vector
    ///
    /// Returns an error if any weight is negative or non-finite, or if the
    /// weights do not sum to 1.0.
    pub fn validate(&self) -> Result<(), String> {
        self.check_components()?;
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!("weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }

    /// Weighted sum of factor scores
    pub fn combine(&self, scores: &FactorScores) -> f32 {
        Factor::ALL
            .iter()
            .map(|f| self.get(*f) * scores.get(*f))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = RankingWeights::default();
        assert_eq!(weights.keyword_match, 0.3);
        assert_eq!(weights.semantic_similarity, 0.3);
        assert_eq!(weights.temporal_relevance, 0.2);
        assert_eq!(weights.user_context, 0.2);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_new_normalizes() {
        let weights = RankingWeights::new(2.0, 2.0, 0.0, 0.0).unwrap();
        assert!((weights.keyword_match - 0.5).abs() < 0.0001);
        assert!((weights.semantic_similarity - 0.5).abs() < 0.0001);
        assert_eq!(weights.temporal_relevance, 0.0);
    }

    #[test]
    fn test_new_rejects_all_zero() {
        assert!(RankingWeights::new(0.0, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_validate_negative_weight() {
        let weights = RankingWeights {
            keyword_match: -0.1,
            semantic_similarity: 0.5,
            temporal_relevance: 0.3,
            user_context: 0.3,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_validate_non_finite_weight() {
        let weights = RankingWeights {
            keyword_match: f32::NAN,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_validate_bad_sum() {
        let weights = RankingWeights {
            keyword_match: 0.5,
            semantic_similarity: 0.5,
            temporal_relevance: 0.5,
            user_context: 0.5,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_combine() {
        let weights = RankingWeights::default();
        let scores = FactorScores {
            keyword_match: 1.0,
            semantic_similarity: 0.5,
            temporal_relevance: 0.5,
            user_context: 0.5,
        };
        let expected = 0.3 * 1.0 + 0.3 * 0.5 + 0.2 * 0.5 + 0.2 * 0.5;
        assert!((weights.combine(&scores) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(RankingWeights::default()).unwrap();
        for factor in Factor::ALL {
            assert!(json.get(factor.as_str()).is_some(), "missing {}", factor);
        }
    }

    #[test]
    fn test_factor_display() {
        assert_eq!(Factor::KeywordMatch.to_string(), "keyword_match");
        assert_eq!(Factor::SemanticSimilarity.to_string(), "semantic_similarity");
        assert_eq!(Factor::TemporalRelevance.to_string(), "temporal_relevance");
        assert_eq!(Factor::UserContext.to_string(), "user_context");
    }
}
