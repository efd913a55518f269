//! Catalogue-phrase matcher
//!
//! Scores entries using only the search hints stored on the entries
//! themselves (primary terms, action terms, misspellings, phrasings). It needs
//! no analyzer and no learned weights.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::MenuEntry;

const NAME_MATCH: f32 = 1.0;
const DESCRIPTION_MATCH: f32 = 0.8;
const PRIMARY_TERM: f32 = 0.7;
const ACTION_TERM: f32 = 0.6;
const SYNONYM: f32 = 0.1;
const ERROR_VARIANT: f32 = 0.5;
const KEYWORD: f32 = 0.4;
const PHRASE: f32 = 0.4;
const REGIONAL_VARIATION: f32 = 0.3;

/// An entry matched by the phrase matcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhraseMatch {
    pub entry: MenuEntry,
    pub score: f32,
}

/// Stateless phrase matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseMatcher;

impl PhraseMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Score every active entry and return those with a positive score,
    /// best first; ties break on `order`, then `id`.
    pub fn search(&self, query: &str, entries: &[MenuEntry]) -> Vec<PhraseMatch> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let tokens: HashSet<&str> = query.split_whitespace().collect();

        let mut matches: Vec<PhraseMatch> = entries
            .iter()
            .filter(|entry| entry.active)
            .filter_map(|entry| {
                let score = self.score(&query, &tokens, entry);
                (score > 0.0).then(|| PhraseMatch {
                    entry: entry.clone(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entry.order.cmp(&b.entry.order))
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
        matches
    }

    /// Score one entry against an already lower-cased query
    pub fn score(&self, query: &str, tokens: &HashSet<&str>, entry: &MenuEntry) -> f32 {
        let mut score = 0.0;

        if entry.name.to_lowercase().contains(query) {
            score += NAME_MATCH;
        }
        if entry.description.to_lowercase().contains(query) {
            score += DESCRIPTION_MATCH;
        }

        let enhancers = &entry.query_enhancers;
        for (term, synonyms) in &enhancers.primary_terms {
            score += term_score(tokens, term, synonyms, PRIMARY_TERM);
        }
        for actions in enhancers.action_terms.values() {
            for (term, synonyms) in actions {
                score += term_score(tokens, term, synonyms, ACTION_TERM);
            }
        }
        for variations in enhancers.error_tolerant_terms.values() {
            for variants in variations.values() {
                if variants
                    .iter()
                    .any(|v| tokens.contains(v.to_lowercase().as_str()))
                {
                    score += ERROR_VARIANT;
                }
            }
        }

        let metadata = &entry.search_metadata;
        if entry
            .keywords
            .iter()
            .chain(&metadata.keywords)
            .any(|kw| contains_phrase(query, kw))
        {
            score += KEYWORD;
        }

        let phrases = &metadata.search_phrases;
        if phrases
            .questions
            .iter()
            .chain(&phrases.commands)
            .any(|p| contains_phrase(query, p))
        {
            score += PHRASE;
        }

        for variations in phrases.regional_variations.values() {
            if variations.iter().any(|v| contains_phrase(query, v)) {
                score += REGIONAL_VARIATION;
            }
        }

        score
    }
}

fn term_score(tokens: &HashSet<&str>, term: &str, synonyms: &str, base: f32) -> f32 {
    if !tokens.contains(term.to_lowercase().as_str()) {
        return 0.0;
    }
    let synonym_hits = synonyms
        .split_whitespace()
        .filter(|s| tokens.contains(s.to_lowercase().as_str()))
        .count();
    base + SYNONYM * synonym_hits as f32
}

// Empty hints would match every query.
fn contains_phrase(query: &str, phrase: &str) -> bool {
    let phrase = phrase.trim();
    !phrase.is_empty() && query.contains(&phrase.to_lowercase())
}
