//! Built-in academic report catalogue

use colored::Colorize;
use serde_json::json;

use crate::args::SeedArgs;
use crate::context::CliContext;
use crate::output::*;
use menu_search::models::MenuEntry;
use menu_search::storage::StorageError;

const CATEGORY: &str = "evaluation reports";

/// Primary terms and their synonyms, attached to every entry whose name or
/// keywords mention the term
const PRIMARY_TERMS: [(&str, &str); 12] = [
    ("check", "evaluation verification assessment"),
    ("marks", "score points grade evaluation"),
    ("report", "details information data"),
    ("exam", "examination test assessment"),
    ("digital", "online electronic computer-based"),
    ("question", "answer problem solution"),
    ("failed", "supplementary repeat retake"),
    ("grace", "additional extra bonus"),
    ("revaluation", "recheck review reassess"),
    ("modify", "change update alter"),
    ("result", "outcome score performance"),
    ("paper", "answer sheet exam script"),
];

struct SeedEntry {
    name: &'static str,
    description: &'static str,
    url: &'static str,
    context: &'static str,
    keywords: &'static [&'static str],
    exam_type: Option<&'static str>,
}

const REPORTS: [SeedEntry; 7] = [
    SeedEntry {
        name: "Revaluation Report",
        description: "Revaluation evaluation report",
        url: "revaluation-report",
        context: "Used when students want their answer sheets to be evaluated again",
        keywords: &[
            "recheck marks",
            "review evaluation",
            "reassessment",
            "check marks again",
            "second evaluation",
            "mark verification",
            "change in marks",
            "correction in evaluation",
        ],
        exam_type: None,
    },
    SeedEntry {
        name: "Grace Mark Report",
        description: "Grace mark report",
        url: "grace-mark-report",
        context: "For viewing and managing additional marks given to students under various policies",
        keywords: &[
            "additional marks",
            "bonus points",
            "extra marks",
            "mark addition",
            "special consideration",
            "passing grace",
            "sports grace",
            "cultural grace",
            "medical grace",
        ],
        exam_type: None,
    },
    SeedEntry {
        name: "Supplementary Report",
        description: "Supplementary examination report",
        url: "supplementary-report",
        context: "Report for students who need to retake exams or clear pending subjects",
        keywords: &[
            "supply exam",
            "repeat exam",
            "failed subjects",
            "pending papers",
            "clearing backlogs",
            "additional attempt",
            "improvement exam",
        ],
        exam_type: Some("supplementary"),
    },
    SeedEntry {
        name: "Moderation Report",
        description: "Moderation report",
        url: "moderation-report",
        context: "Used for reviewing and adjusting marks across different evaluators or centers",
        keywords: &[
            "mark adjustment",
            "score normalization",
            "standardization",
            "scaling of marks",
            "mark modification",
            "result moderation",
            "batch correction",
        ],
        exam_type: None,
    },
    SeedEntry {
        name: "Exam Valuation Report",
        description: "Exam valuation report (regular)",
        url: "exam-valuation-report",
        context: "Primary report for regular examination evaluation results",
        keywords: &[
            "regular evaluation",
            "main exam marks",
            "first evaluation",
            "primary assessment",
            "semester evaluation",
            "term end marks",
            "final marks",
        ],
        exam_type: Some("regular"),
    },
    SeedEntry {
        name: "Digital Valuation Report",
        description: "Digital valuation report",
        url: "digital-valuation-report",
        context: "Report for exams that were evaluated digitally or through online platforms",
        keywords: &[
            "online evaluation",
            "digital marking",
            "e-evaluation",
            "computer based assessment",
            "electronic marking",
            "screen evaluation",
            "digital scoring",
        ],
        exam_type: None,
    },
    SeedEntry {
        name: "Student Question Wise Mark Report",
        description: "Student question wise mark report",
        url: "student-question-wise-mark-report",
        context: "Detailed analysis of marks obtained in each question by students",
        keywords: &[
            "question analysis",
            "per question marks",
            "detailed marks",
            "question-by-question",
            "answer analysis",
            "mark distribution",
            "question pattern performance",
        ],
        exam_type: None,
    },
];

/// The built-in catalogue, in display order
pub fn seed_entries() -> Vec<MenuEntry> {
    REPORTS
        .iter()
        .enumerate()
        .map(|(i, report)| {
            let mut builder = MenuEntry::builder(report.url, report.name)
                .description(report.description)
                .url(format!("/{}", report.url))
                .context(report.context)
                .category(CATEGORY)
                .keywords(report.keywords.iter().copied())
                .order(i as u32 + 1)
                .command(format!("show {}", report.name.to_lowercase()));

            let haystack = format!("{} {}", report.name, report.keywords.join(" ")).to_lowercase();
            for (term, synonyms) in PRIMARY_TERMS {
                if haystack.contains(term) {
                    builder = builder.primary_term(term, synonyms);
                }
            }
            if let Some(exam_type) = report.exam_type {
                builder = builder.exam_type(exam_type);
            }
            builder.build()
        })
        .collect()
}

pub async fn handle_seed(
    args: SeedArgs,
    ctx: &CliContext,
    output_format: &str,
) -> menu_search::Result<()> {
    let existing = ctx.store().list_all().await?;
    if !existing.is_empty() && !args.force {
        let message = format!(
            "Catalogue already has {} entries; use --force to add the built-in reports anyway",
            existing.len()
        );
        if output_format == "json" {
            print_json(&json!({ "seeded": 0, "skipped": 0, "message": message }));
        } else {
            println!("{}", format_warning(&message));
        }
        return Ok(());
    }

    let mut seeded = 0;
    let mut skipped = 0;
    for entry in seed_entries() {
        match ctx.store().add(entry).await {
            Ok(_) => seeded += 1,
            Err(StorageError::AlreadyExists(id)) => {
                tracing::debug!("Seed entry {} already exists", id);
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if output_format == "json" {
        print_json(&json!({ "seeded": seeded, "skipped": skipped }));
    } else {
        println!(
            "{}",
            format_success(&format!(
                "Seeded {} entries into {}",
                seeded,
                ctx.store().catalogue_path().display()
            ))
        );
        if skipped > 0 {
            println!(
                "{}",
                format_info(&format!("{} entries already existed", skipped))
            );
        }
        println!(
            "{} {}",
            "Try:".color(CliColors::muted()),
            "menu-search search \"check my marks again\"".color(CliColors::accent())
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_search::storage::validate_catalogue;

    #[test]
    fn test_seed_catalogue_is_valid() {
        let entries = seed_entries();
        assert_eq!(entries.len(), 7);
        validate_catalogue(&entries).unwrap();
        assert!(entries.iter().all(|e| e.active && !e.keywords.is_empty()));
    }

    #[test]
    fn test_seed_attaches_primary_terms() {
        let entries = seed_entries();
        let revaluation = entries
            .iter()
            .find(|e| e.id == "revaluation-report")
            .unwrap();
        let terms = &revaluation.query_enhancers.primary_terms;
        assert_eq!(
            terms.get("revaluation").map(String::as_str),
            Some("recheck review reassess")
        );
        assert!(terms.contains_key("marks"));
        assert!(terms.contains_key("report"));
    }
}
