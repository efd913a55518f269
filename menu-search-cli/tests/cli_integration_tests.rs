//! Integration tests for the menu-search CLI
//!
//! These tests drive the command handlers against an isolated data
//! directory and check the resulting catalogue and weights through the
//! library API.

use menu_search::config::ConfigBuilder;
use menu_search::search::RankingWeights;
use menu_search_cli::args::*;
use menu_search_cli::commands::MenuCommands;
use menu_search_cli::context::CliContext;
use menu_search_cli::handlers::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create an isolated test CLI context
async fn create_test_context() -> (CliContext, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let config = ConfigBuilder::new()
        .with_data_dir(temp_dir.path())
        .with_feedback_batch_size(3)
        .build()
        .expect("Failed to build config");

    let ctx = CliContext::from_config(config)
        .await
        .expect("Failed to initialize context");

    (ctx, temp_dir)
}

fn add_args(name: &str, keywords: &[&str], category: &str) -> AddEntryArgs {
    AddEntryArgs {
        name: name.to_string(),
        id: None,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        description: String::new(),
        url: String::new(),
        context: String::new(),
        category: category.to_string(),
        parent_id: None,
        order: 0,
        semester: None,
        course: None,
        exam_type: None,
    }
}

fn update_args(id: &str) -> UpdateEntryArgs {
    UpdateEntryArgs {
        id: id.to_string(),
        name: None,
        description: None,
        url: None,
        context: None,
        category: None,
        keywords: None,
        order: None,
        semester: None,
        course: None,
        exam_type: None,
        parent_id: None,
        activate: false,
    }
}

#[tokio::test]
async fn test_seed_then_search() {
    let (ctx, _temp_dir) = create_test_context().await;

    handle_seed(SeedArgs { force: false }, &ctx, "json")
        .await
        .expect("Seed should succeed");
    assert_eq!(ctx.store().list_all().await.unwrap().len(), 7);

    // Seeding again without --force leaves the catalogue alone
    handle_seed(SeedArgs { force: false }, &ctx, "json")
        .await
        .unwrap();
    assert_eq!(ctx.store().list_all().await.unwrap().len(), 7);

    // With --force every entry already exists and is skipped
    handle_seed(SeedArgs { force: true }, &ctx, "json")
        .await
        .unwrap();
    assert_eq!(ctx.store().list_all().await.unwrap().len(), 7);

    let response = ctx.pipeline.search("grace marks report", None).await;
    assert!(!response.is_error());
    assert_eq!(response.results.len(), 7);

    let phrase = ctx.pipeline.phrase_search("show grace mark report").await.unwrap();
    assert_eq!(phrase[0].entry.id, "grace-mark-report");

    handle_search(
        SearchArgs {
            query: "check marks again".to_string(),
            limit: Some(3),
            explain: true,
            user: UserContextArgs::default(),
        },
        &ctx,
        "table",
    )
    .await
    .expect("Search should succeed");
}

#[tokio::test]
async fn test_menu_add_get_update_delete() {
    let (ctx, _temp_dir) = create_test_context().await;

    handle_menu_command(
        MenuCommands::Add(add_args("Fee Receipt", &["fee", "receipt"], "payments")),
        &ctx,
        "json",
    )
    .await
    .expect("Add should succeed");

    let entry = ctx.store().get("fee-receipt").await.unwrap().unwrap();
    assert_eq!(entry.category, "payments");

    // Duplicate IDs are rejected
    let duplicate = handle_menu_command(
        MenuCommands::Add(add_args("Fee Receipt", &["fee"], "payments")),
        &ctx,
        "json",
    )
    .await;
    assert!(duplicate.is_err());

    // A unique prefix resolves to the full ID
    handle_menu_command(
        MenuCommands::Get(GetEntryArgs {
            id: "fee".to_string(),
        }),
        &ctx,
        "table",
    )
    .await
    .expect("Get by prefix should succeed");

    let mut update = update_args("fee-receipt");
    update.description = Some("Receipt for paid examination fees".to_string());
    update.semester = Some("S2".to_string());
    handle_menu_command(MenuCommands::Update(update), &ctx, "json")
        .await
        .expect("Update should succeed");

    let updated = ctx.store().get("fee-receipt").await.unwrap().unwrap();
    assert_eq!(updated.description, "Receipt for paid examination fees");
    assert_eq!(updated.semester.as_deref(), Some("S2"));
    assert_eq!(updated.created_at, entry.created_at);

    // An update without fields is an error
    assert!(
        handle_menu_command(MenuCommands::Update(update_args("fee-receipt")), &ctx, "json")
            .await
            .is_err()
    );

    handle_menu_command(
        MenuCommands::Delete(DeleteEntryArgs {
            id: "fee-receipt".to_string(),
        }),
        &ctx,
        "json",
    )
    .await
    .expect("Delete should succeed");

    let deleted = ctx.store().get("fee-receipt").await.unwrap().unwrap();
    assert!(!deleted.active);
    assert!(ctx.store().load_active().await.unwrap().is_empty());

    let mut reactivate = update_args("fee-receipt");
    reactivate.activate = true;
    handle_menu_command(MenuCommands::Update(reactivate), &ctx, "json")
        .await
        .unwrap();
    assert_eq!(ctx.store().load_active().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_entry_errors() {
    let (ctx, _temp_dir) = create_test_context().await;

    let result = handle_menu_command(
        MenuCommands::Delete(DeleteEntryArgs {
            id: "missing".to_string(),
        }),
        &ctx,
        "json",
    )
    .await;
    assert!(result.is_err());

    let feedback = handle_feedback(
        FeedbackArgs {
            query: "marks".to_string(),
            entry_id: "missing".to_string(),
            flush: false,
            user: UserContextArgs::default(),
        },
        &ctx,
        "json",
    )
    .await;
    assert!(feedback.is_err());
}

#[tokio::test]
async fn test_ambiguous_prefix_is_rejected() {
    let (ctx, _temp_dir) = create_test_context().await;
    handle_seed(SeedArgs { force: false }, &ctx, "json")
        .await
        .unwrap();

    assert_eq!(
        menu_search_cli::resolve_entry_id(&ctx, "dig").await.unwrap(),
        "digital-valuation-report"
    );
    // No ID starts with "report"
    assert!(menu_search_cli::resolve_entry_id(&ctx, "report").await.is_err());

    // Both "student-question-wise-mark-report" and "supplementary-report" start with "s"
    assert!(menu_search_cli::resolve_entry_id(&ctx, "s").await.is_err());
}

#[tokio::test]
async fn test_import_export_round_trip() {
    let (ctx, temp_dir) = create_test_context().await;
    handle_seed(SeedArgs { force: false }, &ctx, "json")
        .await
        .unwrap();

    let export_path = temp_dir.path().join("export.json");
    handle_menu_command(
        MenuCommands::Export(ExportArgs {
            file: export_path.clone(),
        }),
        &ctx,
        "json",
    )
    .await
    .expect("Export should succeed");

    // Import the export into a fresh data directory
    let (other, _other_dir) = create_test_context().await;
    handle_menu_command(
        MenuCommands::Import(ImportArgs {
            file: export_path.clone(),
        }),
        &other,
        "json",
    )
    .await
    .expect("Import should succeed");

    let original = ctx.store().list_all().await.unwrap();
    let imported = other.store().list_all().await.unwrap();
    assert_eq!(original, imported);

    // Importing a malformed file fails and changes nothing
    let bad_path = temp_dir.path().join("bad.json");
    fs::write(&bad_path, "not json").unwrap();
    let result = handle_menu_command(
        MenuCommands::Import(ImportArgs { file: bad_path }),
        &other,
        "json",
    )
    .await;
    assert!(result.is_err());
    assert_eq!(other.store().list_all().await.unwrap().len(), 7);
}

#[tokio::test]
async fn test_feedback_flush_and_weights_reset() {
    let (ctx, _temp_dir) = create_test_context().await;
    handle_seed(SeedArgs { force: false }, &ctx, "json")
        .await
        .unwrap();

    handle_feedback(
        FeedbackArgs {
            query: "check marks again".to_string(),
            entry_id: "revaluation-report".to_string(),
            flush: true,
            user: UserContextArgs::default(),
        },
        &ctx,
        "json",
    )
    .await
    .expect("Feedback should succeed");

    assert_eq!(ctx.pipeline.ranker().pending_feedback(), 0);
    let persisted = ctx.store().load_weights().await.unwrap();
    assert_eq!(persisted, Some(ctx.pipeline.weights()));

    handle_weights(WeightsArgs { reset: true }, &ctx, "json")
        .await
        .expect("Reset should succeed");
    assert_eq!(ctx.pipeline.weights(), RankingWeights::default());
    assert_eq!(
        ctx.store().load_weights().await.unwrap(),
        Some(RankingWeights::default())
    );
}

#[tokio::test]
async fn test_feedback_batch_fills_across_invocations() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = ConfigBuilder::new()
        .with_data_dir(temp_dir.path())
        .with_feedback_batch_size(2)
        .build()
        .unwrap();

    let feedback = |entry_id: &str| FeedbackArgs {
        query: "check marks again".to_string(),
        entry_id: entry_id.to_string(),
        flush: false,
        user: UserContextArgs::default(),
    };

    let first = CliContext::from_config(config.clone()).await.unwrap();
    handle_seed(SeedArgs { force: false }, &first, "json")
        .await
        .unwrap();
    handle_feedback(feedback("revaluation-report"), &first, "json")
        .await
        .unwrap();
    assert_eq!(first.pipeline.ranker().pending_feedback(), 1);
    assert_eq!(first.store().load_weights().await.unwrap(), None);
    drop(first);

    // A later invocation picks up the buffered record and completes the batch
    let second = CliContext::from_config(config).await.unwrap();
    assert_eq!(second.pipeline.ranker().pending_feedback(), 1);
    handle_feedback(feedback("revaluation-report"), &second, "json")
        .await
        .unwrap();
    assert_eq!(second.pipeline.ranker().pending_feedback(), 0);
    assert_eq!(
        second.store().load_weights().await.unwrap(),
        Some(second.pipeline.weights())
    );
    assert!(second.store().load_feedback().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_categories_and_listing() {
    let (ctx, _temp_dir) = create_test_context().await;

    for (name, category) in [
        ("Fee Receipt", "payments"),
        ("Grace Mark Report", "reports"),
        ("Revaluation Report", "reports"),
    ] {
        handle_menu_command(
            MenuCommands::Add(add_args(name, &["keyword"], category)),
            &ctx,
            "json",
        )
        .await
        .unwrap();
    }

    handle_categories(CategoriesArgs { entries: true }, &ctx, "json")
        .await
        .unwrap();
    assert_eq!(
        ctx.pipeline.list_categories().await.unwrap(),
        vec!["payments", "reports"]
    );

    handle_menu_command(
        MenuCommands::List(ListEntriesArgs {
            category: Some("reports".to_string()),
            all: false,
            limit: 10,
        }),
        &ctx,
        "table",
    )
    .await
    .unwrap();
    assert_eq!(ctx.pipeline.list_by_category("reports").await.unwrap().len(), 2);
}
