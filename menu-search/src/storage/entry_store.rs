//! File-backed catalogue store with a staleness-refreshed cache.
//!
//! Reads are served from an in-memory snapshot that is reloaded from disk
//! once it is older than the configured staleness window. Mutations are
//! read-modify-write cycles performed under the exclusive file lock; they
//! persist immediately and replace the snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::StorageConfig;
use crate::models::{MenuEntry, MenuEntryPatch};
use crate::search::{FeedbackRecord, RankingWeights};

use super::errors::{StorageError, StorageResult};
use super::persist;
use super::validation::validate_catalogue;

#[derive(Debug)]
struct Snapshot {
    entries: Arc<Vec<MenuEntry>>,
    loaded_at: Instant,
}

/// Outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Entries whose id was not yet in the catalogue
    pub added: usize,

    /// Existing entries replaced by the imported version
    pub updated: usize,
}

/// The catalogue, weights and feedback store.
///
/// Safe to share between tasks; wrap it in an `Arc`.
#[derive(Debug)]
pub struct EntryStore {
    catalogue_path: PathBuf,
    weights_path: PathBuf,
    feedback_path: PathBuf,
    staleness: Duration,
    cache: RwLock<Option<Snapshot>>,
    write_gate: Mutex<()>,
}

impl EntryStore {
    /// Create a store for the files described by `config`.
    ///
    /// Nothing is read until the first access; missing files are treated as
    /// an empty catalogue and absent weights.
    pub fn open(config: &StorageConfig) -> Self {
        debug!(
            "Opening entry store at {} (staleness {:?})",
            config.data_dir.display(),
            config.staleness
        );
        Self {
            catalogue_path: config.catalogue_path(),
            weights_path: config.weights_path(),
            feedback_path: config.feedback_path(),
            staleness: config.staleness,
            cache: RwLock::new(None),
            write_gate: Mutex::new(()),
        }
    }

    pub fn catalogue_path(&self) -> &Path {
        &self.catalogue_path
    }

    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    pub fn feedback_path(&self) -> &Path {
        &self.feedback_path
    }

    pub fn staleness(&self) -> Duration {
        self.staleness
    }

    async fn read_catalogue(&self) -> StorageResult<Vec<MenuEntry>> {
        let path = self.catalogue_path.clone();
        let entries: Option<Vec<MenuEntry>> =
            tokio::task::spawn_blocking(move || persist::read_json(&path)).await??;
        Ok(entries.unwrap_or_default())
    }

    async fn install(&self, entries: Vec<MenuEntry>) {
        *self.cache.write().await = Some(Snapshot {
            entries: Arc::new(entries),
            loaded_at: Instant::now(),
        });
    }

    /// Current catalogue snapshot, reloading it if it has gone stale.
    ///
    /// A failed reload keeps the previous snapshot; only a failure with no
    /// previous snapshot is returned as an error.
    async fn snapshot(&self) -> StorageResult<Arc<Vec<MenuEntry>>> {
        {
            let cache = self.cache.read().await;
            if let Some(snapshot) = cache.as_ref()
                && snapshot.loaded_at.elapsed() < self.staleness
            {
                return Ok(Arc::clone(&snapshot.entries));
            }
        }

        let mut cache = self.cache.write().await;
        // another task may have reloaded while we waited for the write lock
        if let Some(snapshot) = cache.as_ref()
            && snapshot.loaded_at.elapsed() < self.staleness
        {
            return Ok(Arc::clone(&snapshot.entries));
        }

        match self.read_catalogue().await {
            Ok(entries) => {
                debug!(
                    "Loaded {} entries from {}",
                    entries.len(),
                    self.catalogue_path.display()
                );
                let entries = Arc::new(entries);
                *cache = Some(Snapshot {
                    entries: Arc::clone(&entries),
                    loaded_at: Instant::now(),
                });
                Ok(entries)
            }
            Err(e) => match cache.as_ref() {
                Some(snapshot) => {
                    warn!("Catalogue reload failed, serving previous snapshot: {}", e);
                    Ok(Arc::clone(&snapshot.entries))
                }
                None => {
                    error!("Failed to load catalogue: {}", e);
                    Err(e)
                }
            },
        }
    }

    /// Run `op` against the on-disk catalogue under the exclusive lock.
    ///
    /// `op` returns a value and whether it changed the catalogue; changed
    /// catalogues are validated, written atomically and installed as the
    /// new snapshot.
    async fn mutate<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Vec<MenuEntry>) -> StorageResult<(T, bool)> + Send + 'static,
    {
        let _gate = self.write_gate.lock().await;
        let path = self.catalogue_path.clone();

        let task = move || -> StorageResult<(T, Option<Vec<MenuEntry>>)> {
            let _lock = persist::lock_exclusive(&path)?;
            let mut entries: Vec<MenuEntry> =
                persist::read_json_unlocked(&path)?.unwrap_or_default();

            let (value, changed) = op(&mut entries)?;
            if !changed {
                return Ok((value, None));
            }

            validate_catalogue(&entries)?;
            persist::write_json_unlocked(&path, &entries)?;
            Ok((value, Some(entries)))
        };
        let (value, written) = tokio::task::spawn_blocking(task).await??;

        if let Some(entries) = written {
            self.install(entries).await;
        }
        Ok(value)
    }

    /// Active entries, in catalogue order
    pub async fn load_active(&self) -> StorageResult<Vec<MenuEntry>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.iter().filter(|e| e.active).cloned().collect())
    }

    /// All entries including inactive ones, sorted by `order` then `id`
    pub async fn list_all(&self) -> StorageResult<Vec<MenuEntry>> {
        let snapshot = self.snapshot().await?;
        let mut entries: Vec<MenuEntry> = snapshot.to_vec();
        sort_for_listing(&mut entries);
        Ok(entries)
    }

    /// Any entry by id, active or not
    pub async fn get(&self, id: &str) -> StorageResult<Option<MenuEntry>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.iter().find(|e| e.id == id).cloned())
    }

    /// Sorted, unique, non-empty categories of active entries
    pub async fn list_categories(&self) -> StorageResult<Vec<String>> {
        let snapshot = self.snapshot().await?;
        let mut categories: Vec<String> = snapshot
            .iter()
            .filter(|e| e.active && !e.category.is_empty())
            .map(|e| e.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Active entries of one category, sorted by `order` then `id`
    pub async fn list_by_category(&self, category: &str) -> StorageResult<Vec<MenuEntry>> {
        let snapshot = self.snapshot().await?;
        let mut entries: Vec<MenuEntry> = snapshot
            .iter()
            .filter(|e| e.active && e.category == category)
            .cloned()
            .collect();
        sort_for_listing(&mut entries);
        Ok(entries)
    }

    /// Replace the whole catalogue
    pub async fn save(&self, entries: Vec<MenuEntry>) -> StorageResult<()> {
        validate_catalogue(&entries)?;

        let _gate = self.write_gate.lock().await;
        let path = self.catalogue_path.clone();
        let entries = tokio::task::spawn_blocking(move || -> StorageResult<Vec<MenuEntry>> {
            persist::write_json(&path, &entries)?;
            Ok(entries)
        })
        .await??;

        info!("Saved catalogue with {} entries", entries.len());
        self.install(entries).await;
        Ok(())
    }

    /// Add a new entry; fails if the id is taken
    pub async fn add(&self, entry: MenuEntry) -> StorageResult<MenuEntry> {
        entry.validate().map_err(StorageError::Validation)?;

        let added = self
            .mutate(move |entries| {
                if entries.iter().any(|e| e.id == entry.id) {
                    return Err(StorageError::AlreadyExists(format!(
                        "entry '{}' already exists",
                        entry.id
                    )));
                }
                entries.push(entry.clone());
                Ok((entry, true))
            })
            .await?;

        info!("Added entry {}", added.id);
        Ok(added)
    }

    /// Apply a patch to an entry; `Ok(None)` when the id is unknown
    pub async fn update(
        &self,
        id: &str,
        patch: MenuEntryPatch,
    ) -> StorageResult<Option<MenuEntry>> {
        patch.validate().map_err(StorageError::Validation)?;

        let id = id.to_string();
        let updated = self
            .mutate(move |entries| {
                let Some(existing) = entries.iter_mut().find(|e| e.id == id) else {
                    return Ok((None, false));
                };
                let merged = patch.apply_to(existing).map_err(StorageError::Validation)?;
                *existing = merged.clone();
                Ok((Some(merged), true))
            })
            .await?;

        match &updated {
            Some(entry) => info!("Updated entry {}", entry.id),
            None => debug!("Update skipped, entry not found"),
        }
        Ok(updated)
    }

    /// Mark an entry inactive; `Ok(false)` when the id is unknown
    pub async fn soft_delete(&self, id: &str) -> StorageResult<bool> {
        let id = id.to_string();
        let found = self
            .mutate(move |entries| {
                let Some(existing) = entries.iter_mut().find(|e| e.id == id) else {
                    return Ok((false, false));
                };
                if !existing.active {
                    return Ok((true, false));
                }
                existing.deactivate();
                info!("Deactivated entry {}", existing.id);
                Ok((true, true))
            })
            .await?;
        Ok(found)
    }

    /// Read entries from a JSON file (one object or an array) and merge them
    /// by id. Replaced entries keep their original `created_at`.
    pub async fn import(&self, path: impl AsRef<Path>) -> StorageResult<ImportSummary> {
        let source = path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&source)
            .await
            .map_err(|e| StorageError::Io(format!("read {}: {}", source.display(), e)))?;

        let incoming = parse_entries(&raw)?;
        for entry in &incoming {
            entry.validate().map_err(StorageError::Validation)?;
        }

        let summary = self
            .mutate(move |entries| {
                let mut summary = ImportSummary::default();
                for mut entry in incoming {
                    match entries.iter_mut().find(|e| e.id == entry.id) {
                        Some(existing) => {
                            entry.created_at = existing.created_at;
                            entry.touch();
                            *existing = entry;
                            summary.updated += 1;
                        }
                        None => {
                            entries.push(entry);
                            summary.added += 1;
                        }
                    }
                }
                let changed = summary.added + summary.updated > 0;
                Ok((summary, changed))
            })
            .await?;

        info!(
            "Imported {} from {}: {} added, {} updated",
            summary.added + summary.updated,
            source.display(),
            summary.added,
            summary.updated
        );
        Ok(summary)
    }

    /// Write every entry, inactive ones included, as a JSON array
    pub async fn export(&self, path: impl AsRef<Path>) -> StorageResult<usize> {
        let entries = self.list_all().await?;
        let count = entries.len();
        let target = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || persist::write_json_unlocked(&target, &entries))
            .await??;
        info!("Exported {} entries", count);
        Ok(count)
    }

    /// Drop the snapshot and read the catalogue again
    pub async fn reload(&self) -> StorageResult<usize> {
        let entries = self.read_catalogue().await?;
        let count = entries.len();
        self.install(entries).await;
        debug!("Reloaded {} entries", count);
        Ok(count)
    }

    /// Persisted ranking weights, if any.
    ///
    /// Weights that do not sum to one are renormalized; weights that cannot
    /// be repaired are rejected.
    pub async fn load_weights(&self) -> StorageResult<Option<RankingWeights>> {
        let path = self.weights_path.clone();
        let weights: Option<RankingWeights> =
            tokio::task::spawn_blocking(move || persist::read_json(&path)).await??;

        let Some(mut weights) = weights else {
            return Ok(None);
        };
        if weights.validate().is_ok() {
            return Ok(Some(weights));
        }

        weights.normalize();
        match weights.validate() {
            Ok(()) => {
                warn!("Persisted ranking weights did not sum to 1.0, renormalized");
                Ok(Some(weights))
            }
            Err(e) => Err(StorageError::Validation(format!(
                "persisted ranking weights are invalid: {}",
                e
            ))),
        }
    }

    /// Persist ranking weights
    pub async fn save_weights(&self, weights: &RankingWeights) -> StorageResult<()> {
        weights
            .validate()
            .map_err(|e| StorageError::Validation(format!("ranking weights: {}", e)))?;

        let path = self.weights_path.clone();
        let weights = *weights;
        tokio::task::spawn_blocking(move || persist::write_json(&path, &weights)).await??;
        debug!("Saved ranking weights to {}", self.weights_path.display());
        Ok(())
    }

    /// Feedback records buffered by an earlier process, oldest first.
    ///
    /// Records with scores outside [0, 1] are dropped.
    pub async fn load_feedback(&self) -> StorageResult<Vec<FeedbackRecord>> {
        let path = self.feedback_path.clone();
        let records: Option<Vec<FeedbackRecord>> =
            tokio::task::spawn_blocking(move || persist::read_json(&path)).await??;

        let records = records.unwrap_or_default();
        let total = records.len();
        let records: Vec<FeedbackRecord> = records
            .into_iter()
            .filter(|r| r.scores.is_valid())
            .collect();
        if records.len() < total {
            warn!(
                "Dropped {} feedback records with invalid scores",
                total - records.len()
            );
        }
        Ok(records)
    }

    /// Replace the persisted feedback buffer
    pub async fn save_feedback(&self, records: &[FeedbackRecord]) -> StorageResult<()> {
        let path = self.feedback_path.clone();
        let records = records.to_vec();
        let count = records.len();
        tokio::task::spawn_blocking(move || persist::write_json(&path, &records)).await??;
        debug!(
            "Saved {} pending feedback records to {}",
            count,
            self.feedback_path.display()
        );
        Ok(())
    }
}

fn sort_for_listing(entries: &mut [MenuEntry]) {
    entries.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
}

/// Parse a single entry object or an array of entries
pub fn parse_entries(raw: &str) -> StorageResult<Vec<MenuEntry>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        _ => Err(StorageError::Serialization(
            "expected a JSON object or an array of entries".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_object() {
        let raw = r#"{"id": "a", "name": "A", "keywords": ["k"]}"#;
        let entries = parse_entries(raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a");
        assert!(entries[0].active);
    }

    #[test]
    fn test_parse_array() {
        let raw = r#"[{"id": "a", "name": "A", "keywords": ["k"]},
                      {"id": "b", "name": "B", "keywords": ["k"], "active": false}]"#;
        let entries = parse_entries(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!entries[1].active);
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(matches!(
            parse_entries("42"),
            Err(StorageError::Serialization(_))
        ));
    }
}
