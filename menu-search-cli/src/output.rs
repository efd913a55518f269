use colored::*;
use menu_search::MenuSearchError;
use menu_search::core::{FeedbackOutcome, PipelineError, SearchResponse};
use menu_search::models::MenuEntry;
use menu_search::search::{Factor, PhraseMatch, RankingWeights};
use menu_search::storage::StorageError;
use serde::Serialize;
use serde_json::json;

use crate::utils::truncate;

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn category() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn primary() -> Color {
        Color::White
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn output_error(error_msg: &str, output_format: &str) {
    if output_format == "json" {
        print_json(&json!({
            "error": true,
            "message": error_msg,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    } else {
        tracing::error!("{}", error_msg);
        eprintln!("{}", format_error(error_msg));
    }
}

/// Output a MenuSearchError, as structured JSON when requested
pub fn output_error_json(error: &MenuSearchError, output_format: &str) {
    if output_format != "json" {
        output_error(&error.to_string(), output_format);
        return;
    }

    let code = match error {
        MenuSearchError::Storage(e) | MenuSearchError::Pipeline(PipelineError::Storage(e)) => {
            match e {
                StorageError::NotFound(_) => "NOT_FOUND",
                StorageError::AlreadyExists(_) => "ALREADY_EXISTS",
                StorageError::Validation(_) => "VALIDATION_ERROR",
                StorageError::Lock(_) => "LOCK_ERROR",
                _ => "STORAGE_ERROR",
            }
        }
        MenuSearchError::Configuration(_) => "CONFIGURATION_ERROR",
        MenuSearchError::Logging(_) => "LOGGING_ERROR",
        MenuSearchError::Pipeline(PipelineError::EntryNotFound(_)) => "NOT_FOUND",
        MenuSearchError::Pipeline(_) => "SEARCH_ERROR",
        MenuSearchError::Other(_) => "ERROR",
    };

    print_json(&json!({
        "error": true,
        "code": code,
        "message": error.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }));
}

pub fn format_success(msg: &str) -> String {
    format!(
        "{} {}",
        "✓".color(CliColors::success()).bold(),
        msg.color(CliColors::success())
    )
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

/// Colour a score by how strong it is
pub fn format_score(score: f32) -> ColoredString {
    let text = format!("{:.3}", score);
    if score >= 0.7 {
        text.color(CliColors::success()).bold()
    } else if score >= 0.4 {
        text.color(CliColors::warning())
    } else {
        text.color(CliColors::muted())
    }
}

fn format_status(active: bool) -> ColoredString {
    if active {
        "active".color(CliColors::success())
    } else {
        "inactive".color(CliColors::muted()).dimmed()
    }
}

fn field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{:<12} {}", format!("{}:", label).color(CliColors::muted()), value);
    }
}

pub fn print_entry(entry: &MenuEntry) {
    println!(
        "{} {}",
        entry.name.color(CliColors::primary()).bold(),
        format!("({})", entry.id).color(CliColors::accent())
    );
    println!("{}", "─".repeat(60).color(CliColors::muted()));
    field("Description", &entry.description);
    field("URL", &entry.url);
    field("Context", &entry.context);
    if !entry.category.is_empty() {
        println!(
            "{:<12} {}",
            "Category:".color(CliColors::muted()),
            entry.category.color(CliColors::category())
        );
    }
    field("Keywords", &entry.keywords.join(", "));
    field("Order", &entry.order.to_string());
    println!(
        "{:<12} {}",
        "Status:".color(CliColors::muted()),
        format_status(entry.active)
    );
    field("Parent", entry.parent_id.as_deref().unwrap_or_default());
    field("Semester", entry.semester.as_deref().unwrap_or_default());
    field("Course", entry.course.as_deref().unwrap_or_default());
    field("Exam type", entry.exam_type.as_deref().unwrap_or_default());
    field("Created", &entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string());
    field("Updated", &entry.updated_at.format("%Y-%m-%d %H:%M:%S").to_string());
}

pub fn print_entry_list(entries: &[MenuEntry]) {
    if entries.is_empty() {
        println!("{}", format_info("No entries found."));
        return;
    }

    println!(
        "{}",
        format_info(&format!("Found {} entries:", entries.len()))
    );
    println!();

    println!(
        "{:<36} {:<18} {:<6} {:<10} {}",
        "ID".color(CliColors::muted()).bold(),
        "Category".color(CliColors::muted()).bold(),
        "Order".color(CliColors::muted()).bold(),
        "Status".color(CliColors::muted()).bold(),
        "Name".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(90).color(CliColors::muted()));

    for entry in entries {
        println!(
            "{:<36} {:<18} {:<6} {:<10} {}",
            truncate(&entry.id, 36).color(CliColors::accent()),
            truncate(&entry.category, 18).color(CliColors::category()),
            entry.order,
            format_status(entry.active),
            truncate(&entry.name, 40).color(CliColors::primary())
        );
    }
}

pub fn print_search_response(response: &SearchResponse, explain: bool) {
    let metadata = &response.metadata;

    if let Some(error) = &metadata.error {
        println!("{}", format_error(&format!("Search failed: {}", error)));
        return;
    }
    for warning in &metadata.warnings {
        println!("{}", format_warning(warning));
    }

    if response.results.is_empty() {
        println!("{}", format_info("No results found. Try:"));
        println!("  - Using different keywords");
        println!("  - Being more specific");
        println!("  - 'menu-search categories' to see what the catalogue covers");
        return;
    }

    println!(
        "{}",
        format_info(&format!(
            "Found {} results ({} candidates, {} ms):",
            metadata.result_count, metadata.candidate_count, metadata.elapsed_ms
        ))
    );
    if !metadata.enhanced_terms.is_empty() {
        println!(
            "  {} {}",
            "expanded:".color(CliColors::muted()),
            metadata.enhanced_terms.join(", ")
        );
    }
    println!();

    for (rank, hit) in response.results.iter().enumerate() {
        println!(
            "{:>2}. {}  {} {}",
            rank + 1,
            format_score(hit.score),
            hit.entry.name.color(CliColors::primary()).bold(),
            format!("({})", hit.entry.id).color(CliColors::accent())
        );
        if !hit.entry.description.is_empty() {
            println!("      {}", truncate(&hit.entry.description, 70));
        }
        if !hit.entry.url.is_empty() {
            println!("      {} {}", "url:".color(CliColors::muted()), hit.entry.url);
        }
        if explain {
            let breakdown: Vec<String> = Factor::ALL
                .iter()
                .map(|factor| format!("{}={:.2}", factor, hit.factors.get(*factor)))
                .collect();
            println!(
                "      {}",
                breakdown.join("  ").color(CliColors::muted())
            );
        }
    }
}

pub fn print_phrase_matches(matches: &[PhraseMatch]) {
    if matches.is_empty() {
        println!("{}", format_info("No phrase matches found."));
        return;
    }

    println!(
        "{}",
        format_info(&format!("Found {} phrase matches:", matches.len()))
    );
    println!();
    for m in matches {
        println!(
            "{:>6}  {} {}",
            format!("{:.2}", m.score).color(CliColors::accent()),
            m.entry.name.color(CliColors::primary()).bold(),
            format!("({})", m.entry.id).color(CliColors::muted())
        );
    }
}

pub fn print_weights(weights: &RankingWeights) {
    println!("{}", "Ranking weights".color(CliColors::primary()).bold());
    println!("{}", "─".repeat(40).color(CliColors::muted()));
    for factor in Factor::ALL {
        let value = weights.get(factor);
        let bar = "█".repeat((value * 30.0).round() as usize);
        println!(
            "{:<20} {:.4} {}",
            factor.to_string(),
            value,
            bar.color(CliColors::accent())
        );
    }
}

pub fn print_feedback_outcome(outcome: &FeedbackOutcome) {
    println!(
        "{}",
        format_success(&format!("Feedback recorded for {}", outcome.entry_id))
    );
    match &outcome.updated_weights {
        Some(weights) => {
            println!();
            print_weights(weights);
            if !outcome.weights_persisted {
                println!();
                println!("{}", format_warning("Updated weights were not saved"));
            }
        }
        None => println!(
            "{}",
            format_info(&format!("{} feedback records pending", outcome.pending))
        ),
    }
}
