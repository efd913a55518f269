//! The search pipeline
//!
//! `search` runs analyze → enhance → load active entries → rank and wraps
//! the outcome with metadata. It never fails: collaborator failures degrade
//! the answer (an analyzer that errors or panics leaves the default
//! confidence), and anything worse becomes an empty result list with
//! `metadata.error` set.
//!
//! With persistence enabled, the ranker's weights and its pending feedback
//! buffer are written after every recorded selection, so a short-lived
//! process (one CLI call) hands its feedback on to the next one.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::analysis::{QueryAnalysis, QueryAnalyzer, SimilaritySearch};
use crate::config::SearchConfig;
use crate::models::{MenuEntry, UserContext};
use crate::search::{
    AdaptiveRanker, EnhancedQuery, FeedbackRecord, PhraseMatch, PhraseMatcher, QueryEnhancer,
    RankingWeights, ScoredEntry, ScoringContext,
};
use crate::storage::EntryStore;

use super::response::{
    FeedbackOutcome, PipelineError, ResponseMetadata, SearchResponse, SimilarEntry,
};

// Ranker generations already on disk
#[derive(Debug, Default)]
struct Persisted {
    generation: u64,
    weights_generation: u64,
}

/// Search service over one catalogue
#[derive(Debug, Clone)]
pub struct SearchPipeline {
    store: Arc<EntryStore>,
    ranker: Arc<AdaptiveRanker>,
    enhancer: QueryEnhancer,
    phrase: PhraseMatcher,
    analyzer: Option<Arc<dyn QueryAnalyzer>>,
    similarity: Option<Arc<dyn SimilaritySearch>>,
    settings: SearchConfig,
    persist_weights: bool,
    persisted: Arc<Mutex<Persisted>>,
}

/// Builder for [`SearchPipeline`]
#[derive(Debug)]
pub struct SearchPipelineBuilder {
    store: Arc<EntryStore>,
    ranker: Option<Arc<AdaptiveRanker>>,
    enhancer: QueryEnhancer,
    analyzer: Option<Arc<dyn QueryAnalyzer>>,
    similarity: Option<Arc<dyn SimilaritySearch>>,
    settings: SearchConfig,
    persist_weights: bool,
}

impl SearchPipelineBuilder {
    pub fn new(store: Arc<EntryStore>) -> Self {
        Self {
            store,
            ranker: None,
            enhancer: QueryEnhancer::default(),
            analyzer: None,
            similarity: None,
            settings: SearchConfig::default(),
            persist_weights: true,
        }
    }

    /// Share a ranker (and therefore its weights) with other pipelines
    pub fn ranker(mut self, ranker: Arc<AdaptiveRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    pub fn enhancer(mut self, enhancer: QueryEnhancer) -> Self {
        self.enhancer = enhancer;
        self
    }

    pub fn analyzer(mut self, analyzer: Arc<dyn QueryAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn similarity(mut self, similarity: Arc<dyn SimilaritySearch>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn settings(mut self, settings: SearchConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Whether weights and pending feedback are written to disk
    pub fn persist_weights(mut self, enabled: bool) -> Self {
        self.persist_weights = enabled;
        self
    }

    pub fn build(self) -> SearchPipeline {
        SearchPipeline {
            store: self.store,
            ranker: self
                .ranker
                .unwrap_or_else(|| Arc::new(AdaptiveRanker::new())),
            enhancer: self.enhancer,
            phrase: PhraseMatcher::new(),
            analyzer: self.analyzer,
            similarity: self.similarity,
            settings: self.settings,
            persist_weights: self.persist_weights,
            persisted: Arc::new(Mutex::new(Persisted::default())),
        }
    }
}

impl SearchPipeline {
    pub fn builder(store: Arc<EntryStore>) -> SearchPipelineBuilder {
        SearchPipelineBuilder::new(store)
    }

    pub fn store(&self) -> &Arc<EntryStore> {
        &self.store
    }

    pub fn ranker(&self) -> &Arc<AdaptiveRanker> {
        &self.ranker
    }

    pub fn settings(&self) -> &SearchConfig {
        &self.settings
    }

    /// Current ranking weights
    pub fn weights(&self) -> RankingWeights {
        self.ranker.weights()
    }

    /// Run a ranked search. Never fails; see [`ResponseMetadata::error`].
    pub async fn search(&self, query: &str, user: Option<&UserContext>) -> SearchResponse {
        let started = Instant::now();
        let mut metadata = ResponseMetadata::new(query);

        let outcome = AssertUnwindSafe(self.run_search(query, user, &mut metadata))
            .catch_unwind()
            .await;

        let results = match outcome {
            Ok(Ok(results)) => results,
            Ok(Err(e)) => {
                error!("Search for {:?} failed: {}", query, e);
                metadata.error = Some(e.to_string());
                Vec::new()
            }
            Err(payload) => {
                let e = PipelineError::Panic(panic_message(payload.as_ref()));
                error!("Search for {:?} failed: {}", query, e);
                metadata.error = Some(e.to_string());
                Vec::new()
            }
        };

        metadata.result_count = results.len();
        metadata.elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(
            "Search for {:?} returned {} results in {} ms",
            query, metadata.result_count, metadata.elapsed_ms
        );

        SearchResponse { results, metadata }
    }

    async fn run_search(
        &self,
        query: &str,
        user: Option<&UserContext>,
        metadata: &mut ResponseMetadata,
    ) -> Result<Vec<ScoredEntry>, PipelineError> {
        let (analysis, analyzer_warning) = self.analyze(query).await;
        metadata.warnings.extend(analyzer_warning);
        metadata.intent = analysis.intent.clone();
        metadata.confidence = analysis.confidence;
        metadata.query_type = analysis.query_type;

        let enhanced = match self.enhancer.enhance(query, user) {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!("Query enhancement failed, searching unenhanced: {}", e);
                metadata.warnings.push(format!("enhancement skipped: {}", e));
                EnhancedQuery::unenhanced(query)
            }
        };
        metadata.enhanced_terms = enhanced.enhanced_terms.clone();
        metadata.semantic_variations = enhanced.semantic_variations.clone();
        metadata.extracted_context = enhanced.extracted_context.clone();

        let entries = self.store.load_active().await?;
        metadata.candidate_count = entries.len();

        let ctx = ScoringContext::new(&enhanced, &analysis).with_user(user);
        let mut ranked = self.ranker.rank_results(entries, &ctx);
        ranked.truncate(self.settings.max_results);
        Ok(ranked)
    }

    /// Ask the analyzer; if it fails or panics fall back to the degraded
    /// analysis and return a warning describing why.
    async fn analyze(&self, query: &str) -> (QueryAnalysis, Option<String>) {
        let Some(analyzer) = &self.analyzer else {
            return (QueryAnalysis::degraded(), None);
        };
        match AssertUnwindSafe(analyzer.analyze(query))
            .catch_unwind()
            .await
        {
            Ok(Ok(analysis)) => (analysis, None),
            Ok(Err(e)) => {
                warn!("Query analyzer failed, using default confidence: {}", e);
                (
                    QueryAnalysis::degraded(),
                    Some(format!("analyzer unavailable: {}", e)),
                )
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Query analyzer panicked, using default confidence: {}", message);
                (
                    QueryAnalysis::degraded(),
                    Some(format!("analyzer panicked: {}", message)),
                )
            }
        }
    }

    /// Record that the user picked `entry_id` for `query`.
    ///
    /// The entry is re-scored against the query and the scores are handed to
    /// the ranker. With persistence enabled the pending buffer is saved, and
    /// when this completes a feedback batch the new weights are saved too; a
    /// failed write is logged, not returned.
    pub async fn record_feedback(
        &self,
        query: &str,
        entry_id: &str,
        user: Option<&UserContext>,
    ) -> Result<FeedbackOutcome, PipelineError> {
        let entry = self
            .store
            .get(entry_id)
            .await?
            .filter(|e| e.active)
            .ok_or_else(|| PipelineError::EntryNotFound(entry_id.to_string()))?;

        let (analysis, _) = self.analyze(query).await;
        let enhanced = self
            .enhancer
            .enhance(query, user)
            .unwrap_or_else(|_| EnhancedQuery::unenhanced(query));
        let ctx = ScoringContext::new(&enhanced, &analysis).with_user(user);
        let factors = self.ranker.engine().score(&entry, &ctx)?;

        let updated_weights = self
            .ranker
            .record_feedback(FeedbackRecord::new(query, entry_id, factors));

        if let Some(weights) = &updated_weights {
            info!("Ranking weights updated: {:?}", weights);
        }
        let weights_persisted = self.persist_learning_state().await && updated_weights.is_some();

        Ok(FeedbackOutcome {
            entry_id: entry_id.to_string(),
            factors,
            pending: self.ranker.pending_feedback(),
            updated_weights,
            weights_persisted,
        })
    }

    /// Apply the pending feedback now, without waiting for a full batch.
    ///
    /// Returns the new weights, if there was anything to apply, and whether
    /// they are on disk.
    pub async fn flush_feedback(&self) -> (Option<RankingWeights>, bool) {
        let updated = self.ranker.flush();
        if let Some(weights) = &updated {
            info!("Ranking weights updated by explicit flush: {:?}", weights);
        }
        let persisted = self.persist_learning_state().await && updated.is_some();
        (updated, persisted)
    }

    /// Load the feedback buffer left by an earlier process into the ranker.
    ///
    /// Returns how many records were restored. Complete batches among them
    /// are applied and the resulting weights persisted.
    pub async fn restore_feedback(&self) -> Result<usize, PipelineError> {
        let records = self.store.load_feedback().await?;
        let count = records.len();
        if count == 0 {
            return Ok(0);
        }

        if let Some(weights) = self.ranker.restore_feedback(records) {
            info!("Ranking weights updated from restored feedback: {:?}", weights);
            self.persist_learning_state().await;
        }
        debug!("Restored {} pending feedback records", count);
        Ok(count)
    }

    /// Write the ranker's weights and pending buffer if they are newer than
    /// what is on disk.
    ///
    /// Writers are serialized and always write the latest snapshot, so an
    /// older weight vector never replaces a newer one. Returns whether the
    /// weights on disk are current.
    async fn persist_learning_state(&self) -> bool {
        if !self.persist_weights {
            return false;
        }

        let mut persisted = self.persisted.lock().await;
        let snapshot = self.ranker.snapshot();
        if snapshot.generation <= persisted.generation {
            debug!(
                "Ranker generation {} is already persisted",
                snapshot.generation
            );
            return persisted.weights_generation >= snapshot.weights_generation;
        }

        if snapshot.weights_generation > persisted.weights_generation {
            match self.store.save_weights(&snapshot.weights).await {
                Ok(()) => persisted.weights_generation = snapshot.weights_generation,
                Err(e) => error!("Failed to persist ranking weights: {}", e),
            }
        }
        match self.store.save_feedback(&snapshot.feedback).await {
            Ok(()) => persisted.generation = snapshot.generation,
            Err(e) => error!("Failed to persist pending feedback: {}", e),
        }

        persisted.weights_generation >= snapshot.weights_generation
    }

    /// Sorted categories of active entries
    pub async fn list_categories(&self) -> Result<Vec<String>, PipelineError> {
        Ok(self.store.list_categories().await?)
    }

    /// Active entries of a category
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<MenuEntry>, PipelineError> {
        Ok(self.store.list_by_category(category).await?)
    }

    /// Nearest neighbours from the similarity collaborator.
    ///
    /// Hits below the similarity threshold and hits that do not name an
    /// active entry are dropped.
    pub async fn similar(&self, query: &str) -> Result<Vec<SimilarEntry>, PipelineError> {
        let similarity = self
            .similarity
            .as_ref()
            .ok_or(PipelineError::SimilarityUnavailable)?;

        let top_k = self.settings.similarity_top_k;
        let threshold = self.settings.similarity_threshold;
        let hits = similarity.similarity_search(query, top_k).await?;

        let entries = self.store.load_active().await?;
        let by_id: HashMap<&str, &MenuEntry> =
            entries.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut similar: Vec<SimilarEntry> = hits
            .into_iter()
            .filter(|(_, score)| score.is_finite() && *score >= threshold)
            .filter_map(|(id, score)| {
                by_id.get(id.as_str()).map(|entry| SimilarEntry {
                    entry: (*entry).clone(),
                    similarity: score,
                })
            })
            .collect();
        similar.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        similar.truncate(top_k);

        debug!("Similarity search for {:?} kept {} hits", query, similar.len());
        Ok(similar)
    }

    /// Match the query against the search hints stored on the entries
    pub async fn phrase_search(&self, query: &str) -> Result<Vec<PhraseMatch>, PipelineError> {
        let entries = self.store.load_active().await?;
        let mut matches = self.phrase.search(query, &entries);
        matches.truncate(self.settings.max_results);
        Ok(matches)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
