//! Search, feedback and weight handlers

use serde_json::json;

use crate::args::*;
use crate::context::CliContext;
use crate::output::*;
use crate::utils::user_context;
use colored::Colorize;
use menu_search::search::RankingWeights;

pub async fn handle_search(
    args: SearchArgs,
    ctx: &CliContext,
    output_format: &str,
) -> menu_search::Result<()> {
    let user = user_context(&args.user);
    tracing::debug!("Searching for {:?} with context {:?}", args.query, user);
    let mut response = ctx.pipeline.search(&args.query, user.as_ref()).await;

    if let Some(limit) = args.limit {
        response.results.truncate(limit);
        response.metadata.result_count = response.results.len();
    }

    if output_format == "json" {
        print_json(&response);
    } else {
        print_search_response(&response, args.explain);
    }
    Ok(())
}

pub async fn handle_phrase(
    args: PhraseArgs,
    ctx: &CliContext,
    output_format: &str,
) -> menu_search::Result<()> {
    let mut matches = ctx.pipeline.phrase_search(&args.query).await?;
    if let Some(limit) = args.limit {
        matches.truncate(limit);
    }

    if output_format == "json" {
        print_json(&matches);
    } else {
        print_phrase_matches(&matches);
    }
    Ok(())
}

pub async fn handle_feedback(
    args: FeedbackArgs,
    ctx: &CliContext,
    output_format: &str,
) -> menu_search::Result<()> {
    let entry_id = crate::utils::resolve_entry_id(ctx, &args.entry_id).await?;
    let user = user_context(&args.user);
    let mut outcome = ctx
        .pipeline
        .record_feedback(&args.query, &entry_id, user.as_ref())
        .await?;

    if args.flush && outcome.updated_weights.is_none() {
        let (weights, persisted) = ctx.pipeline.flush_feedback().await;
        if let Some(weights) = weights {
            tracing::debug!("Flushed partial feedback batch: {:?}", weights);
            outcome.pending = ctx.pipeline.ranker().pending_feedback();
            outcome.updated_weights = Some(weights);
            outcome.weights_persisted = persisted;
        }
    }

    if output_format == "json" {
        print_json(&outcome);
    } else {
        print_feedback_outcome(&outcome);
    }
    Ok(())
}

pub async fn handle_categories(
    args: CategoriesArgs,
    ctx: &CliContext,
    output_format: &str,
) -> menu_search::Result<()> {
    let categories = ctx.pipeline.list_categories().await?;

    if output_format == "json" {
        if args.entries {
            let mut grouped = serde_json::Map::new();
            for category in &categories {
                let entries = ctx.pipeline.list_by_category(category).await?;
                grouped.insert(category.clone(), json!(entries));
            }
            print_json(&grouped);
        } else {
            print_json(&categories);
        }
        return Ok(());
    }

    if categories.is_empty() {
        println!("{}", format_info("No menu categories found."));
        return Ok(());
    }

    println!("{}", "Available categories:".bold());
    for category in &categories {
        let entries = ctx.pipeline.list_by_category(category).await?;
        println!(
            "\n{} ({} active entries)",
            category.color(CliColors::category()).bold(),
            entries.len()
        );
        if args.entries {
            for entry in entries {
                println!("  - {} {}", entry.name, format!("({})", entry.id).color(CliColors::muted()));
            }
        }
    }
    Ok(())
}

pub async fn handle_weights(
    args: WeightsArgs,
    ctx: &CliContext,
    output_format: &str,
) -> menu_search::Result<()> {
    if args.reset {
        let defaults = RankingWeights::default();
        ctx.pipeline.ranker().set_weights(defaults);
        ctx.store().save_weights(&defaults).await?;
        if output_format != "json" {
            println!("{}", format_success("Ranking weights reset to defaults"));
            println!();
        }
    }

    let weights = ctx.pipeline.weights();
    if output_format == "json" {
        print_json(&weights);
    } else {
        print_weights(&weights);
    }
    Ok(())
}
