//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of harvest
//! results: the latest run's counters, queue sizes, and the harvested
//! addresses.

use crate::output::summary::{HarvestSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const LIST_LIMIT: usize = 500;

/// Generates a markdown summary file
///
/// # Arguments
///
/// * `summary` - The harvest summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &HarvestSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a harvest summary as markdown
pub fn format_markdown_summary(summary: &HarvestSummary) -> String {
    let mut md = String::new();

    md.push_str("# Contact-Harvest Summary\n\n");

    // Run metadata
    md.push_str("## Latest Run\n\n");
    match summary.run_id {
        Some(run_id) => {
            md.push_str(&format!("- **Run ID**: {}\n", run_id));
            if let Some(started) = &summary.started_at {
                md.push_str(&format!("- **Started**: {}\n", started));
            }
            if let Some(finished) = &summary.finished_at {
                md.push_str(&format!("- **Finished**: {}\n", finished));
            }
            if let Some(duration) = summary.duration_seconds {
                md.push_str(&format!("- **Duration**: {} seconds\n", duration));
            }
            if let Some(status) = &summary.status {
                md.push_str(&format!("- **Status**: {}\n", status));
            }
            if let Some(hash) = &summary.config_hash {
                md.push_str(&format!("- **Config Hash**: {}\n", hash));
            }
            if let Some(rate) = summary.seed_success_rate() {
                md.push_str(&format!("- **Seed Success Rate**: {:.2}%\n", rate));
            }
            md.push('\n');
        }
        None => md.push_str("No runs recorded yet.\n\n"),
    }

    if let Some(report) = &summary.report {
        md.push_str("## Run Counters\n\n");
        md.push_str("| Stage | Counter | Value |\n");
        md.push_str("|-------|---------|-------|\n");
        for (stage, counter, value) in [
            ("Search", "Queries ok", report.queries_ok),
            ("Search", "Queries failed", report.queries_failed),
            ("Search", "Origins found", report.origins_found),
            ("Search", "New targets", report.targets_recorded),
            ("Crawl", "Seeds ok", report.seeds_ok),
            ("Crawl", "Seeds failed", report.seeds_failed),
            ("Crawl", "Pages ok", report.pages_ok),
            ("Crawl", "Pages failed", report.pages_failed),
            ("Dispatch", "Batches ok", report.batches_ok),
            ("Dispatch", "Batches failed", report.batches_failed),
            ("Crawl", "Emails found", report.emails_found),
            ("Crawl", "New emails", report.emails_recorded),
        ] {
            md.push_str(&format!("| {} | {} | {} |\n", stage, counter, value));
        }
        md.push('\n');
    }

    // Queue and result counts
    let stats = &summary.stats;
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Scrape Targets**: {} ({} pending)\n",
        stats.targets_total, stats.targets_pending
    ));
    md.push_str(&format!(
        "- **Search Queries**: {} ({} pending)\n",
        stats.queries_total, stats.queries_pending
    ));
    md.push_str(&format!("- **Email Addresses**: {}\n", stats.emails_total));
    md.push_str(&format!("- **Runs**: {}\n\n", stats.runs_total));

    push_list(&mut md, "Email Addresses", &summary.emails);
    push_list(&mut md, "Scrape Targets", &summary.targets);

    md
}

fn push_list(md: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", title));
    for item in items.iter().take(LIST_LIMIT) {
        md.push_str(&format!("- {}\n", item));
    }
    if items.len() > LIST_LIMIT {
        md.push_str(&format!("\n... and {} more\n", items.len() - LIST_LIMIT));
    }
    md.push('\n');
}
