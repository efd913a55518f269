//! Query enhancement
//!
//! Expands a raw query into extra search terms, pulls academic context
//! (semester, exam type, document type) out of the text and merges it with
//! whatever the caller already knows about the user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::EnhancerConfig;
use crate::models::UserContext;

/// Default upper bound on accepted query length, in characters
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 1000;

const SEMESTERS: &[&str] = &["S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8"];
const EXAM_TYPES: &[&str] = &["regular", "supplementary", "revaluation"];
const DOCUMENT_TYPES: &[&str] = &["report", "receipt", "application", "result"];

const VARIATION_TRIGGERS: &[(&str, &[&str])] = &[
    ("check", &["view", "see", "find"]),
    ("marks", &["grade", "result", "score"]),
    ("exam", &["test", "assessment", "evaluation"]),
];

/// Errors that can occur while enhancing a query
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EnhancementError {
    /// The query exceeds the configured maximum length
    #[error("Query too long: {length} characters (max {max})")]
    QueryTooLong { length: usize, max: usize },

    /// Anything else that prevented enhancement
    #[error("Enhancement failed: {0}")]
    Internal(String),
}

/// Academic context taken from the query text and the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedContext {
    pub semester: Option<String>,
    pub exam_type: Option<String>,
    pub document_type: Option<String>,
    pub course: Option<String>,
}

impl ExtractedContext {
    /// Overlay the non-empty fields of a caller context
    pub fn merge_user_context(&mut self, user: &UserContext) {
        if let Some(semester) = &user.current_semester {
            self.semester = Some(semester.clone());
        }
        if let Some(exam_type) = &user.exam_type {
            self.exam_type = Some(exam_type.clone());
        }
        if let Some(course) = &user.course {
            self.course = Some(course.clone());
        }
    }
}

/// An enhanced query, ready for scoring
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnhancedQuery {
    pub original_query: String,
    pub enhanced_terms: Vec<String>,
    pub extracted_context: ExtractedContext,
    pub semantic_variations: Vec<String>,
}

impl EnhancedQuery {
    /// Fallback used when enhancement fails: the raw query and nothing else
    pub fn unenhanced(query: impl Into<String>) -> Self {
        Self {
            original_query: query.into(),
            ..Default::default()
        }
    }
}

/// Expands queries using a fixed term table and fixed academic vocabularies
#[derive(Debug, Clone)]
pub struct QueryEnhancer {
    expansions: BTreeMap<String, Vec<String>>,
    max_query_length: usize,
}

impl Default for QueryEnhancer {
    fn default() -> Self {
        Self {
            expansions: default_expansions(),
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
        }
    }
}

/// The built-in expansion table
pub fn default_expansions() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 4] = [
        ("marks", &["grade", "score", "result", "performance"]),
        ("exam", &["examination", "test", "assessment"]),
        ("payment", &["fee", "amount", "transaction"]),
        ("report", &["document", "certificate", "statement"]),
    ];
    table
        .into_iter()
        .map(|(key, terms)| {
            (
                key.to_string(),
                terms.iter().map(|t| (*t).to_string()).collect(),
            )
        })
        .collect()
}

impl QueryEnhancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EnhancerConfig) -> Self {
        let expansions = match &config.expansions {
            Some(table) if !table.is_empty() => table
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect(),
            _ => default_expansions(),
        };
        Self {
            expansions,
            max_query_length: config.max_query_length,
        }
    }

    pub fn with_max_query_length(mut self, max: usize) -> Self {
        self.max_query_length = max;
        self
    }

    pub fn with_expansions(mut self, expansions: BTreeMap<String, Vec<String>>) -> Self {
        self.expansions = expansions;
        self
    }

    pub fn max_query_length(&self) -> usize {
        self.max_query_length
    }

    /// Enhance a query, merging in the caller's context when given
    pub fn enhance(
        &self,
        query: &str,
        user_context: Option<&UserContext>,
    ) -> Result<EnhancedQuery, EnhancementError> {
        let length = query.chars().count();
        if length > self.max_query_length {
            return Err(EnhancementError::QueryTooLong {
                length,
                max: self.max_query_length,
            });
        }

        let query_lower = query.to_lowercase();

        let mut extracted_context = self.extract_context(&query_lower);
        if let Some(user) = user_context {
            extracted_context.merge_user_context(user);
        }

        Ok(EnhancedQuery {
            original_query: query.to_string(),
            enhanced_terms: self.expand_terms(&query_lower),
            extracted_context,
            semantic_variations: semantic_variations(&query_lower),
        })
    }

    fn expand_terms(&self, query_lower: &str) -> Vec<String> {
        query_lower
            .split_whitespace()
            .filter_map(|token| self.expansions.get(token))
            .flatten()
            .cloned()
            .collect()
    }

    fn extract_context(&self, query_lower: &str) -> ExtractedContext {
        ExtractedContext {
            semester: first_match(SEMESTERS, query_lower),
            exam_type: first_match(EXAM_TYPES, query_lower),
            document_type: first_match(DOCUMENT_TYPES, query_lower),
            course: None,
        }
    }
}

fn first_match(vocabulary: &[&str], query_lower: &str) -> Option<String> {
    vocabulary
        .iter()
        .find(|term| query_lower.contains(&term.to_lowercase()))
        .map(|term| (*term).to_string())
}

fn semantic_variations(query_lower: &str) -> Vec<String> {
    let mut variations: Vec<String> = Vec::new();
    for (trigger, terms) in VARIATION_TRIGGERS {
        if !query_lower.contains(trigger) {
            continue;
        }
        for term in *terms {
            if !variations.iter().any(|v| v == term) {
                variations.push((*term).to_string());
            }
        }
    }
    variations
}
