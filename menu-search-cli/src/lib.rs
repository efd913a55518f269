pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;
pub mod utils;

pub use context::CliContext;
pub use output::{
    CliColors, format_error, format_info, format_score, format_success, format_warning,
    output_error, output_error_json, print_entry, print_entry_list, print_json,
    print_phrase_matches, print_search_response, print_weights,
};
pub use utils::{resolve_entry_id, user_context};
