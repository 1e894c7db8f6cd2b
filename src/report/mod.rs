pub mod types;

pub use types::{ItemDigest, Report, ReportScope};

use std::fmt::Write as _;
use std::path::Path;

use chrono::Local;
use colored::Colorize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::activity::{ActivityLedger, WorkItem};
use crate::summarize::{best_effort, prompts, Summarizer};

const NO_ACTIVITY: &str = "No issue or pull request activity in this range.";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Summarize every work item in the ledger, then the whole period.
///
/// Items are summarized one at a time, issues first, each in ascending id
/// order. A failed item summary leaves that narrative empty and the run
/// carries on. With nothing in the ledger the timecard call is skipped.
#[instrument(skip_all, fields(user = %scope.tracked_user, style = %scope.style, items = ledger.len()))]
pub async fn build<S: Summarizer + ?Sized>(
    summarizer: &S,
    ledger: &ActivityLedger,
    scope: ReportScope,
) -> Report {
    let issues = digest_all(summarizer, ledger, ledger.issues().collect()).await;
    let pulls = digest_all(summarizer, ledger, ledger.pulls().collect()).await;

    let timecard = if ledger.is_empty() {
        NO_ACTIVITY.to_string()
    } else {
        info!("creating timecard");
        let body = render_body(&issues, &pulls);
        best_effort(summarizer, &scope.style.timecard_role(), &body).await
    };

    Report {
        scope,
        issues,
        pulls,
        timecard,
    }
}

async fn digest_all<S: Summarizer + ?Sized>(
    summarizer: &S,
    ledger: &ActivityLedger,
    mut items: Vec<&WorkItem>,
) -> Vec<ItemDigest> {
    items.sort_by_key(|item| item.id);
    let mut digests = Vec::with_capacity(items.len());
    for item in items {
        info!(id = %item.id, kind = ?item.kind, "summarizing work item");
        let narrative = best_effort(summarizer, prompts::ITEM_ROLE, &item_instruction(ledger, item)).await;
        digests.push(ItemDigest {
            id: item.id,
            url: item.url.clone(),
            title: item.title.clone(),
            is_author: item.is_author,
            action_count: ledger.actions(item.id).len(),
            narrative,
        });
    }
    digests
}

/// Per-item instruction in the layout `prompts::ITEM_ROLE` describes.
pub fn item_instruction(ledger: &ActivityLedger, item: &WorkItem) -> String {
    let actions = ledger.actions(item.id);
    let mut instr = String::new();
    let _ = write!(instr, "Summary of #{} ({}) {}\n-\n", item.id, item.url, item.title);
    let _ = write!(instr, "Author: {}\n-\n", item.is_author);
    let _ = write!(instr, "Description: {}\n-\n", item.description);
    let _ = write!(instr, "Actions: {}\n-\n", actions.len());
    for action in actions {
        let _ = write!(
            instr,
            "Action: {}\nObject: {}\nContent: {}\n-\n",
            action.action, action.object, action.content
        );
    }
    instr
}

/// Text handed to the timecard summarizer, in the layout `prompts::TIMECARD_ROLE` describes.
pub fn render_body(issues: &[ItemDigest], pulls: &[ItemDigest]) -> String {
    let mut body = String::from("\nIssues:\n\n");
    for issue in issues {
        let _ = writeln!(body, "Issue: #{} ({}) {}", issue.id, issue.url, issue.title);
        let _ = writeln!(body, "Description: {}", issue.narrative);
    }
    body.push_str("\nPulls:\n\n");
    for pull in pulls {
        let _ = writeln!(body, "PR: #{} ({}) {}", pull.id, pull.url, pull.title);
        let _ = writeln!(body, "Description: {}", pull.narrative);
    }
    body
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(items = report.item_count()))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

fn begin_label(report: &Report) -> String {
    report
        .scope
        .begin
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Print the timecard with a colored header:
///
/// Timecard for alice: this-week (since 2025-01-27 00:00)
/// Repository: org/repo | Issues: 2 | Pulls: 3 | Style: executive
///
/// ═══ Timecard ═══
/// ...
fn print_terminal_report(report: &Report) {
    let scope = &report.scope;
    println!();
    println!(
        "Timecard for {}: {} (since {})",
        scope.tracked_user.bold(),
        scope.range.to_string().cyan(),
        begin_label(report)
    );
    println!(
        "Repository: {} | Issues: {} | Pulls: {} | Style: {}",
        scope.repo.as_deref().unwrap_or("all"),
        report.issues.len(),
        report.pulls.len(),
        scope.style
    );
    println!();
    println!("{}", "═══ Timecard ═══".bold());
    if report.timecard.is_empty() {
        println!("{}", "  Summary unavailable.".yellow());
    } else {
        println!("{}", report.timecard);
    }
    println!();
}

/// Write the report as a markdown file: header, timecard, then every
/// item's narrative so the timecard can be checked against its sources.
fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, render_markdown(report))?;
    Ok(())
}

fn render_markdown(report: &Report) -> String {
    let scope = &report.scope;
    let mut md = String::new();
    let _ = writeln!(md, "# Timecard for {}: {}\n", scope.tracked_user, scope.range);
    let _ = writeln!(
        md,
        "**Since:** {} | **Repository:** {} | **Style:** {}\n",
        begin_label(report),
        scope.repo.as_deref().unwrap_or("all"),
        scope.style
    );

    md.push_str("## Summary\n\n");
    if report.timecard.is_empty() {
        md.push_str("_Summary unavailable._\n\n");
    } else {
        let _ = writeln!(md, "{}\n", report.timecard.trim());
    }

    md.push_str("## Work items\n\n");
    for (heading, digests) in [("Issues", &report.issues), ("Pulls", &report.pulls)] {
        let _ = writeln!(md, "### {heading}\n");
        if digests.is_empty() {
            md.push_str("None.\n\n");
            continue;
        }
        for digest in digests {
            let role = if digest.is_author { "author" } else { "contributor" };
            let _ = writeln!(
                md,
                "- **[#{}]({})** {} ({}, {} actions)",
                digest.id, digest.url, digest.title, role, digest.action_count
            );
            if !digest.narrative.is_empty() {
                let _ = writeln!(md, "  {}", digest.narrative);
            }
        }
        md.push('\n');
    }
    md
}
