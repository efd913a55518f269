//! Term-group analyzer that needs no model.

use super::{AnalyzerError, DEFAULT_CONFIDENCE, QueryAnalysis, QueryAnalyzer, QueryType};
use async_trait::async_trait;

const ACADEMIC_TERMS: &[(&str, &[&str])] = &[
    ("revaluation", &["recheck", "reeval", "review"]),
    ("results", &["marks", "grade", "score", "performance"]),
    ("examination", &["exam", "test", "assessment"]),
    ("payment", &["fee", "amount", "pay", "receipt"]),
];

const QUESTION_WORDS: &[&str] = &["how", "what", "why", "when"];
const SEARCH_WORDS: &[&str] = &["find", "search", "look", "need"];

/// Analyzer that derives intent from fixed academic term groups.
///
/// The intent is the group with the most matching terms (declaration order
/// breaks ties). Confidence starts at 0.6 for one matched term and grows by
/// 0.1 per extra term up to 0.95; a query matching nothing gets the default
/// confidence and the intent `general`.
#[derive(Debug, Clone, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn query_type(query_lower: &str) -> QueryType {
        if QUESTION_WORDS.iter().any(|w| query_lower.contains(w)) {
            QueryType::Question
        } else if SEARCH_WORDS.iter().any(|w| query_lower.contains(w)) {
            QueryType::Search
        } else {
            QueryType::Statement
        }
    }

    /// Synchronous core, shared with tests
    pub fn analyze_sync(&self, query: &str) -> QueryAnalysis {
        let query_lower = query.to_lowercase();

        let mut academic_context = Vec::new();
        let mut best: Option<(&str, usize)> = None;
        let mut total_hits = 0usize;

        for (group, terms) in ACADEMIC_TERMS {
            let hits = terms.iter().filter(|t| query_lower.contains(*t)).count();
            if hits == 0 {
                continue;
            }
            academic_context.push((*group).to_string());
            total_hits += hits;
            if best.is_none_or(|(_, best_hits)| hits > best_hits) {
                best = Some((group, hits));
            }
        }

        let (intent, confidence) = match best {
            Some((group, _)) => {
                let confidence = (0.6 + 0.1 * (total_hits.saturating_sub(1)) as f32).min(0.95);
                (group.to_string(), confidence)
            }
            None => ("general".to_string(), DEFAULT_CONFIDENCE),
        };

        QueryAnalysis {
            intent,
            confidence,
            academic_context,
            query_type: Self::query_type(&query_lower),
        }
    }
}

#[async_trait]
impl QueryAnalyzer for KeywordAnalyzer {
    async fn analyze(&self, query: &str) -> Result<QueryAnalysis, AnalyzerError> {
        Ok(self.analyze_sync(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_is_general() {
        let analysis = KeywordAnalyzer::new().analyze_sync("hall ticket");
        assert_eq!(analysis.intent, "general");
        assert_eq!(analysis.confidence, DEFAULT_CONFIDENCE);
        assert!(analysis.academic_context.is_empty());
        assert_eq!(analysis.query_type, QueryType::Statement);
    }

    #[test]
    fn test_intent_prefers_group_with_most_hits() {
        let analysis = KeywordAnalyzer::new().analyze_sync("recheck my marks and grade");
        assert_eq!(analysis.intent, "results");
        assert_eq!(analysis.academic_context, vec!["revaluation", "results"]);
        assert!((analysis.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_query_type_detection() {
        let analyzer = KeywordAnalyzer::new();
        assert_eq!(
            analyzer.analyze_sync("how do I pay the fee").query_type,
            QueryType::Question
        );
        assert_eq!(
            analyzer.analyze_sync("find exam schedule").query_type,
            QueryType::Search
        );
    }

    #[tokio::test]
    async fn test_trait_impl_never_fails() {
        let analysis = KeywordAnalyzer::new().analyze("exam").await.unwrap();
        assert_eq!(analysis.intent, "examination");
        assert!((analysis.confidence - 0.6).abs() < 1e-6);
    }
}
