//! Catalogue management handlers

use colored::Colorize;
use serde_json::json;

use crate::args::*;
use crate::commands::MenuCommands;
use crate::context::CliContext;
use crate::output::*;
use crate::utils::*;
use menu_search::MenuSearchError;
use menu_search::models::{MenuEntry, MenuEntryPatch, slugify};

pub async fn handle_menu_command(
    cmd: MenuCommands,
    ctx: &CliContext,
    output_format: &str,
) -> menu_search::Result<()> {
    match cmd {
        MenuCommands::Add(args) => {
            let entry = build_entry(args)?;
            let added = ctx.store().add(entry).await?;

            if output_format == "json" {
                print_json(&added);
            } else {
                println!(
                    "{}",
                    format_success(&format!(
                        "Entry created with ID: {}",
                        added.id.color(CliColors::accent()).bold()
                    ))
                );
            }
        }

        MenuCommands::Get(args) => {
            let id = resolve_entry_id(ctx, &args.id).await?;
            let entry = ctx
                .store()
                .get(&id)
                .await?
                .ok_or_else(|| MenuSearchError::Other(format!("Entry '{}' not found", id)))?;

            if output_format == "json" {
                print_json(&entry);
            } else {
                print_entry(&entry);
            }
        }

        MenuCommands::Update(args) => {
            let id = resolve_entry_id(ctx, &args.id).await?;
            let patch = build_patch(args);
            if patch.is_empty() {
                return Err(MenuSearchError::Other(
                    "Nothing to update; pass at least one field".to_string(),
                ));
            }

            match ctx.store().update(&id, patch).await? {
                Some(entry) => {
                    if output_format == "json" {
                        print_json(&entry);
                    } else {
                        println!(
                            "{}",
                            format_success(&format!("Updated entry: {}", entry.name))
                        );
                    }
                }
                None => {
                    return Err(MenuSearchError::Other(format!("Entry '{}' not found", id)));
                }
            }
        }

        MenuCommands::List(args) => {
            let mut entries = match &args.category {
                Some(category) if !args.all => ctx.store().list_by_category(category).await?,
                Some(category) => ctx
                    .store()
                    .list_all()
                    .await?
                    .into_iter()
                    .filter(|e| &e.category == category)
                    .collect(),
                None if args.all => ctx.store().list_all().await?,
                None => ctx
                    .store()
                    .list_all()
                    .await?
                    .into_iter()
                    .filter(|e| e.active)
                    .collect(),
            };
            entries.truncate(args.limit);

            if output_format == "json" {
                print_json(&entries);
            } else {
                print_entry_list(&entries);
            }
        }

        MenuCommands::Delete(args) => {
            let id = resolve_entry_id(ctx, &args.id).await?;
            let found = ctx.store().soft_delete(&id).await?;
            if !found {
                return Err(MenuSearchError::Other(format!("Entry '{}' not found", id)));
            }

            if output_format == "json" {
                print_json(&json!({ "deactivated": id }));
            } else {
                println!("{}", format_success(&format!("Deactivated entry: {}", id)));
            }
        }

        MenuCommands::Import(args) => {
            let summary = ctx.store().import(&args.file).await?;

            if output_format == "json" {
                print_json(&summary);
            } else {
                println!(
                    "{}",
                    format_success(&format!(
                        "Imported {} entries ({} added, {} updated)",
                        summary.added + summary.updated,
                        summary.added,
                        summary.updated
                    ))
                );
            }
        }

        MenuCommands::Export(args) => {
            let count = ctx.store().export(&args.file).await?;

            if output_format == "json" {
                print_json(&json!({ "exported": count, "file": args.file }));
            } else {
                println!(
                    "{}",
                    format_success(&format!(
                        "Exported {} entries to {}",
                        count,
                        args.file.display()
                    ))
                );
            }
        }
    }

    Ok(())
}

fn build_entry(args: AddEntryArgs) -> menu_search::Result<MenuEntry> {
    let keywords = clean_keywords(args.keywords);
    if keywords.is_empty() {
        return Err(MenuSearchError::Other(
            "At least one keyword is required".to_string(),
        ));
    }

    let id = match args.id {
        Some(id) => id,
        None => slugify(&args.name),
    };

    let mut builder = MenuEntry::builder(id, args.name)
        .description(args.description)
        .url(args.url)
        .context(args.context)
        .category(args.category)
        .keywords(keywords)
        .order(args.order);
    if let Some(parent) = args.parent_id {
        builder = builder.parent(parent);
    }
    if let Some(semester) = args.semester {
        builder = builder.semester(semester);
    }
    if let Some(course) = args.course {
        builder = builder.course(course);
    }
    if let Some(exam_type) = args.exam_type {
        builder = builder.exam_type(exam_type);
    }
    Ok(builder.build())
}

fn build_patch(args: UpdateEntryArgs) -> MenuEntryPatch {
    MenuEntryPatch {
        name: args.name,
        description: args.description,
        url: args.url,
        context: args.context,
        category: args.category,
        keywords: args.keywords.map(clean_keywords),
        order: args.order,
        active: args.activate.then_some(true),
        parent_id: args.parent_id.map(optional_field),
        semester: args.semester.map(optional_field),
        course: args.course.map(optional_field),
        exam_type: args.exam_type.map(optional_field),
        ..MenuEntryPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_args(name: &str) -> AddEntryArgs {
        AddEntryArgs {
            name: name.to_string(),
            id: None,
            keywords: vec!["grace marks".to_string(), " ".to_string()],
            description: String::new(),
            url: String::new(),
            context: String::new(),
            category: "grace".to_string(),
            parent_id: None,
            order: 2,
            semester: Some("S4".to_string()),
            course: None,
            exam_type: None,
        }
    }

    #[test]
    fn test_build_entry_derives_id() {
        let entry = build_entry(add_args("Grace Mark Report")).unwrap();
        assert_eq!(entry.id, "grace-mark-report");
        assert_eq!(entry.keywords, vec!["grace marks"]);
        assert_eq!(entry.semester.as_deref(), Some("S4"));
        assert!(entry.active);
    }

    #[test]
    fn test_build_entry_needs_keywords() {
        let mut args = add_args("Empty");
        args.keywords = vec![" ".to_string()];
        assert!(build_entry(args).is_err());
    }

    #[test]
    fn test_build_patch_clears_with_none() {
        let patch = build_patch(UpdateEntryArgs {
            id: "x".to_string(),
            name: None,
            description: None,
            url: None,
            context: None,
            category: None,
            keywords: None,
            order: Some(4),
            semester: Some("none".to_string()),
            course: Some("BTech".to_string()),
            exam_type: None,
            parent_id: None,
            activate: false,
        });
        assert_eq!(patch.order, Some(4));
        assert_eq!(patch.semester, Some(None));
        assert_eq!(patch.course, Some(Some("BTech".to_string())));
        assert!(patch.active.is_none());
        assert!(!patch.is_empty());
    }
}
