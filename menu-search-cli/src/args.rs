//! Command argument structures
//!
//! This module contains all CLI argument structs organized by command category.

use std::path::PathBuf;

use clap::Args;

/// User context flags shared by search and feedback
#[derive(Args, Debug, Clone, Default)]
pub struct UserContextArgs {
    /// Semester the user is currently in (S1..S8)
    #[arg(long)]
    pub semester: Option<String>,

    /// Course the user is enrolled in
    #[arg(long)]
    pub course: Option<String>,

    /// Exam type the user is dealing with (regular, supplementary, ...)
    #[arg(long)]
    pub exam_type: Option<String>,
}

// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Natural-language query
    pub query: String,

    /// Maximum number of results (defaults to the configured maximum)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Show the per-factor score breakdown
    #[arg(long)]
    pub explain: bool,

    #[command(flatten)]
    pub user: UserContextArgs,
}

#[derive(Args)]
pub struct PhraseArgs {
    /// Query matched against the phrasings stored on entries
    pub query: String,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct FeedbackArgs {
    /// The query the user searched for
    pub query: String,

    /// ID of the entry the user picked
    pub entry_id: String,

    /// Apply the buffered feedback now instead of waiting for a full batch
    #[arg(long)]
    pub flush: bool,

    #[command(flatten)]
    pub user: UserContextArgs,
}

#[derive(Args)]
pub struct CategoriesArgs {
    /// Also list the active entries of each category
    #[arg(long)]
    pub entries: bool,
}

#[derive(Args)]
pub struct WeightsArgs {
    /// Reset the ranking weights to their defaults
    #[arg(long)]
    pub reset: bool,
}

#[derive(Args)]
pub struct SeedArgs {
    /// Seed even when the catalogue already has entries
    #[arg(long)]
    pub force: bool,
}

// Menu command arguments
#[derive(Args)]
pub struct AddEntryArgs {
    /// Display name
    pub name: String,

    /// Entry ID (derived from the name when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Comma-separated keywords
    #[arg(long, short, value_delimiter = ',', required = true)]
    pub keywords: Vec<String>,

    /// Description
    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Target URL or route
    #[arg(long, default_value = "")]
    pub url: String,

    /// When the feature is used
    #[arg(long, default_value = "")]
    pub context: String,

    /// Catalogue category
    #[arg(long, short, default_value = "")]
    pub category: String,

    /// Parent entry ID
    #[arg(long)]
    pub parent_id: Option<String>,

    /// Display order
    #[arg(long, default_value_t = 0)]
    pub order: u32,

    /// Semester the entry concerns
    #[arg(long)]
    pub semester: Option<String>,

    /// Course the entry concerns
    #[arg(long)]
    pub course: Option<String>,

    /// Exam type the entry concerns
    #[arg(long)]
    pub exam_type: Option<String>,
}

#[derive(Args)]
pub struct GetEntryArgs {
    /// Entry ID (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct UpdateEntryArgs {
    /// Entry ID (a unique prefix is enough)
    pub id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New URL
    #[arg(long)]
    pub url: Option<String>,

    /// New context
    #[arg(long)]
    pub context: Option<String>,

    /// New category
    #[arg(long)]
    pub category: Option<String>,

    /// New comma-separated keywords
    #[arg(long, value_delimiter = ',')]
    pub keywords: Option<Vec<String>>,

    /// New display order
    #[arg(long)]
    pub order: Option<u32>,

    /// New semester ("none" clears it)
    #[arg(long)]
    pub semester: Option<String>,

    /// New course ("none" clears it)
    #[arg(long)]
    pub course: Option<String>,

    /// New exam type ("none" clears it)
    #[arg(long)]
    pub exam_type: Option<String>,

    /// New parent ID ("none" clears it)
    #[arg(long)]
    pub parent_id: Option<String>,

    /// Re-activate a deleted entry
    #[arg(long)]
    pub activate: bool,
}

#[derive(Args)]
pub struct ListEntriesArgs {
    /// Only entries of this category
    #[arg(long, short)]
    pub category: Option<String>,

    /// Include inactive entries
    #[arg(long, short)]
    pub all: bool,

    /// Maximum number of entries
    #[arg(short, long, default_value_t = 100)]
    pub limit: usize,
}

#[derive(Args)]
pub struct DeleteEntryArgs {
    /// Entry ID (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file with one entry or an array of entries
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Destination JSON file
    pub file: PathBuf,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
