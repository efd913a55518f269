//! Command enum definitions
//!
//! This module contains all CLI command enums that define the command structure.

use crate::args::*;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Display version information
    Version,

    /// Ranked natural-language search over active entries
    #[command(
        alias = "find",
        long_about = r#"
Search the catalogue with a natural-language query. The query is expanded with
domain synonyms, every active entry is scored on four factors (keyword match,
semantic similarity, temporal relevance, user context) and the results are
ranked with the current adaptive weights.

EXAMPLES:
  # Plain query
  menu-search search "check my S5 marks"

  # With user context, showing the factor breakdown
  menu-search search "revaluation result" --semester S5 --exam-type regular --explain

  # JSON for scripts
  menu-search search "grace marks" --output json

RELATED COMMANDS:
  • menu-search feedback "<query>" <entry-id> - Record which result was picked
  • menu-search phrase "<query>" - Match against stored phrasings only
"#
    )]
    Search(SearchArgs),

    /// Match a query against the phrasings stored on entries
    Phrase(PhraseArgs),

    /// Record which entry a user picked for a query
    #[command(long_about = r#"
Record that a user picked an entry for a query. The entry is re-scored and the
scores are buffered; once a full batch is collected the ranking weights are
updated and written to the weights file.

The pending buffer is kept in the data directory between invocations. Pass
--flush to apply whatever is buffered right away instead of waiting for a full
batch.

EXAMPLES:
  menu-search feedback "check my marks" exam-valuation-report
  menu-search feedback "check my marks" exam-valuation-report --flush
"#)]
    Feedback(FeedbackArgs),

    /// List the categories of active entries
    Categories(CategoriesArgs),

    /// Show or reset the ranking weights
    Weights(WeightsArgs),

    /// Catalogue management commands
    #[command(subcommand)]
    Menu(MenuCommands),

    /// Write the built-in academic report catalogue
    Seed(SeedArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Subcommand)]
pub enum MenuCommands {
    /// Add a new entry
    #[command(long_about = r#"
Add a new entry to the catalogue. The ID is derived from the name unless --id
is given; IDs must be unique and parents must exist.

EXAMPLES:
  menu-search menu add "Grace Mark Report" -k "grace marks,bonus points" -c grace
  menu-search menu add "Fee Receipt" --id fee-receipt -k fee,receipt --parent-id payments
"#)]
    Add(AddEntryArgs),

    /// Show an entry by ID
    #[command(alias = "show")]
    Get(GetEntryArgs),

    /// Update fields of an entry
    Update(UpdateEntryArgs),

    /// List entries
    #[command(alias = "ls")]
    List(ListEntriesArgs),

    /// Deactivate an entry (entries are never removed)
    #[command(alias = "rm")]
    Delete(DeleteEntryArgs),

    /// Merge entries from a JSON file
    Import(ImportArgs),

    /// Write every entry, inactive ones included, to a JSON file
    Export(ExportArgs),
}
