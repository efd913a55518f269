//! Adaptive ranking
//!
//! The ranker owns the weight vector. It combines factor scores into a
//! relevance, sorts entries deterministically and learns new weights from
//! buffered user selections.

use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::MenuEntry;

use super::calculator::{ScoringContext, ScoringEngine};
use super::scoring::{Factor, FactorScores, RankingWeights};

/// Number of feedback records that triggers a weight update
pub const DEFAULT_FEEDBACK_BATCH_SIZE: usize = 100;

/// Factor score above which a selection counts as a success for that factor
pub const SUCCESS_THRESHOLD: f32 = 0.7;

/// Share of the old weight kept on update
pub const WEIGHT_RETENTION: f32 = 0.8;

/// A user selection together with the factor scores seen at that moment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub query: String,
    pub entry_id: String,
    pub scores: FactorScores,
}

impl FeedbackRecord {
    pub fn new(query: impl Into<String>, entry_id: impl Into<String>, scores: FactorScores) -> Self {
        Self {
            query: query.into(),
            entry_id: entry_id.into(),
            scores,
        }
    }
}

/// An entry with its relevance and the factor scores behind it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredEntry {
    pub entry: MenuEntry,
    pub score: f32,
    pub factors: FactorScores,
}

#[derive(Debug)]
struct RankerState {
    weights: RankingWeights,
    feedback: Vec<FeedbackRecord>,
    // bumped on every change to weights or buffer
    generation: u64,
    weights_generation: u64,
}

impl RankerState {
    fn touch(&mut self) {
        self.generation += 1;
    }

    fn set_weights(&mut self, weights: RankingWeights) {
        self.weights = weights;
        self.generation += 1;
        self.weights_generation = self.generation;
    }

    // Apply every complete batch at the head of the buffer
    fn drain_full_batches(&mut self, batch_size: usize) -> Option<RankingWeights> {
        let mut updated = None;
        while self.feedback.len() >= batch_size {
            let rest = self.feedback.split_off(batch_size);
            update_weights(self);
            self.feedback = rest;
            self.touch();
            updated = Some(self.weights);
        }
        updated
    }
}

/// Point-in-time copy of the ranker's learning state.
///
/// Generations only grow, so a writer holding an older snapshot can tell
/// that a newer one has already been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankerSnapshot {
    pub generation: u64,
    pub weights_generation: u64,
    pub weights: RankingWeights,
    pub feedback: Vec<FeedbackRecord>,
}

/// Weighted ranker that adapts its weights from feedback.
///
/// Weights and the feedback buffer sit behind one mutex, so appending a
/// record, checking the threshold, updating the weights and clearing the
/// buffer happen as a single step.
#[derive(Debug)]
pub struct AdaptiveRanker {
    engine: ScoringEngine,
    state: Mutex<RankerState>,
    batch_size: usize,
}

impl Default for AdaptiveRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveRanker {
    /// Ranker with default weights and batch size
    pub fn new() -> Self {
        Self::with_weights(RankingWeights::default())
    }

    /// Ranker starting from the given weights.
    ///
    /// Weights that fail validation are normalized; if that is not possible
    /// the defaults are used instead.
    pub fn with_weights(weights: RankingWeights) -> Self {
        Self {
            engine: ScoringEngine::new(),
            state: Mutex::new(RankerState {
                weights: sanitize(weights),
                feedback: Vec::new(),
                generation: 0,
                weights_generation: 0,
            }),
            batch_size: DEFAULT_FEEDBACK_BATCH_SIZE,
        }
    }

    /// Set the flush threshold; zero is treated as one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    // A panic while holding the lock cannot leave the state half-updated
    // (every mutation is a plain assignment), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, RankerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current weights
    pub fn weights(&self) -> RankingWeights {
        self.lock().weights
    }

    /// Number of buffered feedback records
    pub fn pending_feedback(&self) -> usize {
        self.lock().feedback.len()
    }

    /// Weights, buffer and generations, read under one lock
    pub fn snapshot(&self) -> RankerSnapshot {
        let state = self.lock();
        RankerSnapshot {
            generation: state.generation,
            weights_generation: state.weights_generation,
            weights: state.weights,
            feedback: state.feedback.clone(),
        }
    }

    /// Score and sort entries.
    ///
    /// Results are ordered by relevance (descending), then `order`, then `id`.
    /// An entry that cannot be scored gets relevance 0.0. The weights are
    /// always finite: every way of setting them goes through `sanitize` or a
    /// validated update.
    pub fn rank_results(
        &self,
        entries: Vec<MenuEntry>,
        ctx: &ScoringContext<'_>,
    ) -> Vec<ScoredEntry> {
        let weights = self.weights();

        let mut ranked: Vec<ScoredEntry> = entries
            .into_iter()
            .map(|entry| match self.engine.score(&entry, ctx) {
                Ok(factors) => {
                    let score = weights.combine(&factors);
                    ScoredEntry { entry, score, factors }
                }
                Err(e) => {
                    debug!("Scoring entry {} failed: {}", entry.id, e);
                    ScoredEntry {
                        entry,
                        score: 0.0,
                        factors: FactorScores::default(),
                    }
                }
            })
            .collect();

        ranked.sort_by(compare_scored);
        debug!("Ranked {} entries", ranked.len());
        ranked
    }

    /// Buffer a selection.
    ///
    /// The call that fills the buffer to the batch size updates the weights
    /// and clears the buffer before returning; it returns the new weights so
    /// the caller can persist them. Every other call returns `None`.
    pub fn record_feedback(&self, record: FeedbackRecord) -> Option<RankingWeights> {
        let mut state = self.lock();
        state.feedback.push(record);
        state.touch();
        debug!(
            "Buffered feedback ({}/{})",
            state.feedback.len(),
            self.batch_size
        );

        state.drain_full_batches(self.batch_size)
    }

    /// Put records buffered by an earlier process back into the buffer.
    ///
    /// Restored records go ahead of anything recorded since. Complete
    /// batches are applied immediately; the new weights are returned when
    /// that happens.
    pub fn restore_feedback(&self, records: Vec<FeedbackRecord>) -> Option<RankingWeights> {
        if records.is_empty() {
            return None;
        }
        let mut state = self.lock();
        let newer = std::mem::replace(&mut state.feedback, records);
        state.feedback.extend(newer);
        state.touch();
        debug!("Restored feedback buffer ({} records)", state.feedback.len());

        state.drain_full_batches(self.batch_size)
    }

    /// Apply the buffered feedback now without waiting for a full batch.
    ///
    /// Returns `None` when the buffer is empty.
    pub fn flush(&self) -> Option<RankingWeights> {
        let mut state = self.lock();
        if state.feedback.is_empty() {
            return None;
        }
        update_weights(&mut state);
        state.feedback.clear();
        state.touch();
        Some(state.weights)
    }

    /// Replace the weights, e.g. after loading them from disk
    pub fn set_weights(&self, weights: RankingWeights) {
        self.lock().set_weights(sanitize(weights));
    }
}

fn update_weights(state: &mut RankerState) {
    let total = state.feedback.len();
    if total == 0 {
        return;
    }

    let mut next = state.weights;
    for factor in Factor::ALL {
        let successes = state
            .feedback
            .iter()
            .filter(|r| r.scores.get(factor) > SUCCESS_THRESHOLD)
            .count();
        let rate = successes as f32 / total as f32;
        let old = state.weights.get(factor);
        next.set(factor, old * WEIGHT_RETENTION + rate * (1.0 - WEIGHT_RETENTION));
    }
    next.normalize();

    if next.validate().is_ok() {
        info!(
            "Updated ranking weights from {} feedback records: {:?}",
            total, next
        );
        state.set_weights(next);
    } else {
        warn!("Discarding invalid weight update: {:?}", next);
    }
}

fn sanitize(weights: RankingWeights) -> RankingWeights {
    if weights.validate().is_ok() {
        return weights;
    }
    let mut normalized = weights;
    normalized.normalize();
    if normalized.validate().is_ok() {
        normalized
    } else {
        warn!("Invalid ranking weights {:?}, using defaults", weights);
        RankingWeights::default()
    }
}

fn compare_scored(a: &ScoredEntry, b: &ScoredEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.entry.order.cmp(&b.entry.order))
        .then_with(|| a.entry.id.cmp(&b.entry.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QueryAnalysis;
    use crate::models::UserContext;
    use crate::search::enhancer::EnhancedQuery;

    fn entry(id: &str, name: &str, order: u32) -> MenuEntry {
        MenuEntry::builder(id, name).keyword("k").order(order).build()
    }

    fn query(terms: &[&str]) -> EnhancedQuery {
        EnhancedQuery {
            original_query: terms.join(" "),
            enhanced_terms: terms.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn scores(k: f32, s: f32, t: f32, u: f32) -> FactorScores {
        FactorScores {
            keyword_match: k,
            semantic_similarity: s,
            temporal_relevance: t,
            user_context: u,
        }
    }

    #[test]
    fn test_rank_by_relevance_then_order_then_id() {
        let ranker = AdaptiveRanker::new();
        let q = query(&["grade"]);
        let analysis = QueryAnalysis::degraded();
        let ctx = ScoringContext::new(&q, &analysis);

        let entries = vec![
            entry("z", "Fee Receipt", 1),
            entry("b", "Hostel", 3),
            entry("a", "Library", 3),
            entry("g", "Grade Card", 9),
        ];
        let ranked = ranker.rank_results(entries, &ctx);
        let ids: Vec<_> = ranked.iter().map(|r| r.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["g", "z", "a", "b"]);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_failing_entry_scores_zero() {
        let ranker = AdaptiveRanker::new();
        let q = query(&["grade"]);
        let analysis = QueryAnalysis::degraded();
        let ctx = ScoringContext::new(&q, &analysis);

        let mut broken = entry("broken", "Grade Card", 0);
        broken.keywords.clear();
        let ranked = ranker.rank_results(vec![broken, entry("ok", "Hostel", 1)], &ctx);
        assert_eq!(ranked[0].entry.id, "ok");
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_semester_context_lifts_entry() {
        let ranker = AdaptiveRanker::new();
        let q = query(&[]);
        let analysis = QueryAnalysis::degraded();
        let user = UserContext::new().with_semester("S4");
        let ctx = ScoringContext::new(&q, &analysis).with_user(Some(&user));

        let mut s4 = entry("s4", "Grade Card", 5);
        s4.semester = Some("S4".to_string());
        let ranked = ranker.rank_results(vec![entry("other", "Grade Card", 0), s4], &ctx);
        assert_eq!(ranked[0].entry.id, "s4");
        assert!((ranked[0].score - ranked[1].score - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_flush_happens_exactly_at_batch_size() {
        let ranker = AdaptiveRanker::new();
        for i in 0..99 {
            let record = FeedbackRecord::new("q", format!("e{i}"), scores(0.9, 0.5, 0.5, 0.5));
            let r = ranker.record_feedback(record);
            assert!(r.is_none());
        }
        assert_eq!(ranker.pending_feedback(), 99);
        assert_eq!(ranker.weights(), RankingWeights::default());

        let record = FeedbackRecord::new("q", "last", scores(0.9, 0.5, 0.5, 0.5));
        let updated = ranker.record_feedback(record);
        assert!(updated.is_some());
        assert_eq!(ranker.pending_feedback(), 0);
    }

    #[test]
    fn test_ema_update() {
        let ranker = AdaptiveRanker::new().with_batch_size(4);
        // keyword succeeds in every record, semantic in half, others never
        for i in 0..4 {
            let s = if i % 2 == 0 { 0.9 } else { 0.1 };
            ranker.record_feedback(FeedbackRecord::new("q", "e", scores(0.95, s, 0.5, 0.5)));
        }
        let w = ranker.weights();
        // raw: 0.44, 0.34, 0.16, 0.16 -> sum 1.1
        assert!((w.keyword_match - 0.44 / 1.1).abs() < 1e-5);
        assert!((w.semantic_similarity - 0.34 / 1.1).abs() < 1e-5);
        assert!((w.temporal_relevance - 0.16 / 1.1).abs() < 1e-5);
        assert!((w.user_context - 0.16 / 1.1).abs() < 1e-5);
        assert!((w.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_threshold_is_strict() {
        let ranker = AdaptiveRanker::new().with_batch_size(1);
        let w = ranker
            .record_feedback(FeedbackRecord::new("q", "e", scores(0.7, 0.7, 0.7, 0.7)))
            .unwrap();
        // no factor succeeded, so every weight shrinks by the same factor
        assert!((w.keyword_match - 0.3).abs() < 1e-5);
        assert!((w.temporal_relevance - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let ranker = AdaptiveRanker::new();
        assert!(ranker.flush().is_none());
        assert_eq!(ranker.weights(), RankingWeights::default());
    }

    #[test]
    fn test_invalid_initial_weights_are_sanitized() {
        let ranker = AdaptiveRanker::with_weights(RankingWeights {
            keyword_match: 1.0,
            semantic_similarity: 1.0,
            temporal_relevance: 1.0,
            user_context: 1.0,
        });
        assert!((ranker.weights().keyword_match - 0.25).abs() < 1e-5);

        let ranker = AdaptiveRanker::with_weights(RankingWeights {
            keyword_match: f32::INFINITY,
            ..Default::default()
        });
        assert_eq!(ranker.weights(), RankingWeights::default());
    }

    #[test]
    fn test_weights_stay_valid_over_many_updates() {
        let ranker = AdaptiveRanker::new().with_batch_size(10);
        for i in 0..500 {
            let v = (i % 10) as f32 / 10.0;
            ranker.record_feedback(FeedbackRecord::new("q", "e", scores(v, 1.0 - v, v, 0.8)));
            let w = ranker.weights();
            assert!(w.validate().is_ok());
        }
    }

    #[test]
    fn test_concurrent_feedback_flushes_once_per_batch() {
        use std::sync::Arc;
        use std::thread;

        const THREADS: usize = 8;
        const PER_THREAD: usize = 130;
        let ranker = Arc::new(AdaptiveRanker::new());

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let ranker = Arc::clone(&ranker);
                thread::spawn(move || {
                    (0..PER_THREAD)
                        .filter(|i| {
                            let record = FeedbackRecord::new(
                                "q",
                                format!("e{t}-{i}"),
                                scores(0.9, 0.2, 0.5, 0.5),
                            );
                            ranker.record_feedback(record).is_some()
                        })
                        .count()
                })
            })
            .collect();

        let flushes: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        let total = THREADS * PER_THREAD;
        assert_eq!(flushes, total / DEFAULT_FEEDBACK_BATCH_SIZE);
        assert_eq!(ranker.pending_feedback(), total % DEFAULT_FEEDBACK_BATCH_SIZE);
        assert!(ranker.weights().validate().is_ok());
    }

    #[test]
    fn test_restore_feedback_goes_ahead_of_new_records() {
        let ranker = AdaptiveRanker::new().with_batch_size(3);
        ranker.record_feedback(FeedbackRecord::new("q", "new", scores(0.5, 0.5, 0.5, 0.5)));

        let restored = vec![FeedbackRecord::new("q", "old-1", scores(0.9, 0.5, 0.5, 0.5))];
        assert!(ranker.restore_feedback(restored).is_none());

        let snapshot = ranker.snapshot();
        let ids: Vec<_> = snapshot.feedback.iter().map(|r| r.entry_id.as_str()).collect();
        assert_eq!(ids, vec!["old-1", "new"]);
        assert_eq!(snapshot.weights_generation, 0);
    }

    #[test]
    fn test_restore_feedback_applies_complete_batches() {
        let ranker = AdaptiveRanker::new().with_batch_size(2);
        let records: Vec<_> = (0..5)
            .map(|i| FeedbackRecord::new("q", format!("e{i}"), scores(0.9, 0.5, 0.5, 0.5)))
            .collect();

        let updated = ranker.restore_feedback(records);
        assert!(updated.is_some());
        assert_eq!(ranker.weights(), updated.unwrap());

        let snapshot = ranker.snapshot();
        assert_eq!(snapshot.feedback.len(), 1);
        assert_eq!(snapshot.feedback[0].entry_id, "e4");
        assert!(snapshot.weights.keyword_match > RankingWeights::default().keyword_match);
    }

    #[test]
    fn test_generations_only_grow() {
        let ranker = AdaptiveRanker::new().with_batch_size(2);
        let start = ranker.snapshot();

        ranker.record_feedback(FeedbackRecord::new("q", "a", scores(0.9, 0.5, 0.5, 0.5)));
        let buffered = ranker.snapshot();
        assert!(buffered.generation > start.generation);
        assert_eq!(buffered.weights_generation, start.weights_generation);

        ranker.record_feedback(FeedbackRecord::new("q", "b", scores(0.9, 0.5, 0.5, 0.5)));
        let flushed = ranker.snapshot();
        assert!(flushed.generation > buffered.generation);
        assert!(flushed.weights_generation > buffered.weights_generation);
        assert!(flushed.feedback.is_empty());
    }

    #[test]
    fn test_set_weights_never_stores_non_finite_values() {
        let ranker = AdaptiveRanker::new();
        ranker.set_weights(RankingWeights {
            semantic_similarity: f32::NAN,
            ..Default::default()
        });
        assert_eq!(ranker.weights(), RankingWeights::default());

        let q = query(&["grade"]);
        let analysis = QueryAnalysis::degraded();
        let ctx = ScoringContext::new(&q, &analysis);
        let ranked = ranker.rank_results(
            vec![entry("hostel", "Hostel", 0), entry("grade", "Grade Card", 1)],
            &ctx,
        );
        assert_eq!(ranked[0].entry.id, "grade");
        assert!(ranked.iter().all(|r| r.score.is_finite()));
    }
}
