//! Data models for the menu catalogue

pub mod context;
pub mod entry;

pub use context::UserContext;
pub use entry::{
    MenuEntry, MenuEntryBuilder, MenuEntryPatch, QueryEnhancers, SearchMetadata, SearchPhrases,
    slugify,
};
