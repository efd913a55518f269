//! Catalogue and weights persistence
//!
//! The catalogue is a JSON array of entries in `<data_dir>/menus.json` and
//! the adapted ranking weights live in `<data_dir>/ranking_weights.json`.
//! Both files are guarded by sidecar lock files (shared for reads, exclusive
//! for writes) and replaced atomically, so several processes can share one
//! data directory.

pub mod entry_store;
pub mod errors;
mod persist;
pub mod validation;

pub use entry_store::{EntryStore, ImportSummary, parse_entries};
pub use errors::{StorageError, StorageResult};
pub use validation::validate_catalogue;
