//! Command handlers for the menu-search CLI

pub mod menu;
pub mod search;
pub mod seed;

pub use menu::handle_menu_command;
pub use search::{
    handle_categories, handle_feedback, handle_phrase, handle_search, handle_weights,
};
pub use seed::{handle_seed, seed_entries};
