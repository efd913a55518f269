use crate::args::UserContextArgs;
use crate::context::CliContext;
use menu_search::MenuSearchError;
use menu_search::models::UserContext;

/// Trim keywords and drop empty ones
pub fn clean_keywords(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

/// `None` for "none" or an empty string, used to clear optional fields
pub fn optional_field(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn user_context(args: &UserContextArgs) -> Option<UserContext> {
    let user = UserContext {
        current_semester: args.semester.clone(),
        course: args.course.clone(),
        exam_type: args.exam_type.clone(),
    };
    (!user.is_empty()).then_some(user)
}

/// Shorten `text` to at most `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Resolve a full entry ID from an exact ID or a unique prefix
pub async fn resolve_entry_id(ctx: &CliContext, id: &str) -> menu_search::Result<String> {
    let entries = ctx.store().list_all().await?;
    if entries.iter().any(|e| e.id == id) {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = entries.iter().filter(|e| e.id.starts_with(id)).collect();

    match matches.len() {
        0 => Err(MenuSearchError::Other(format!(
            "No entry found with ID prefix '{}'",
            id
        ))),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let suggestions: Vec<String> = matches
                .iter()
                .take(5)
                .map(|e| format!("  - {} ({})", e.id, e.name))
                .collect();
            Err(MenuSearchError::Other(format!(
                "Ambiguous ID prefix '{}': {} matches found.\nSuggestions:\n{}",
                id,
                matches.len(),
                suggestions.join("\n")
            )))
        }
    }
}
