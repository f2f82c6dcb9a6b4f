// src/utils/console.rs

//! Human-readable console report for a finished run.
//!
//! Diagnostics go through the `log` facade; this module only renders the
//! categorized results that the operator asked for.

use std::fmt::Write as _;

use crate::models::{ResultSet, YearEntry, YearOutcome};

const RULE_WIDTH: usize = 60;

/// Render the result set as sectioned text, one section per fiscal year.
pub fn render_report(results: &ResultSet, verbose: bool) -> String {
    let mut out = String::new();

    for entry in &results.entries {
        render_entry(&mut out, entry, verbose);
    }

    if results.cancelled {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Run interrupted; fiscal years that did not finish are not shown."
        );
    }

    render_summary(&mut out, results);
    out
}

/// Print the rendered report to stdout.
pub fn print_report(results: &ResultSet, verbose: bool) {
    print!("{}", render_report(results, verbose));
}

fn render_entry(out: &mut String, entry: &YearEntry, verbose: bool) {
    let border = "═".repeat(RULE_WIDTH);
    let title = match &entry.outcome {
        YearOutcome::Found { urls } => format!(
            "FY {} Budget PDFs ({} found)",
            entry.fiscal_year,
            urls.len()
        ),
        YearOutcome::Failed { .. } => format!("FY {} Budget PDFs (search failed)", entry.fiscal_year),
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "{border}");
    let _ = writeln!(out, "  {title}");
    let _ = writeln!(out, "{border}");

    if verbose {
        if let Some(query) = &entry.query {
            let _ = writeln!(out, "    Query: {query}");
        }
    }

    match &entry.outcome {
        YearOutcome::Found { urls } if urls.is_empty() => {
            let _ = writeln!(out, "    No results found.");
        }
        YearOutcome::Found { urls } => {
            for (index, url) in urls.iter().enumerate() {
                let _ = writeln!(out, "[{}] {}", index + 1, url);
            }
            if verbose {
                let _ = writeln!(
                    out,
                    "    Origins: {} direct, {} scanned",
                    entry.direct_count,
                    urls.len().saturating_sub(entry.direct_count)
                );
            }
        }
        YearOutcome::Failed { reason } => {
            let _ = writeln!(out, "    Search failed: {reason}");
        }
    }
}

fn render_summary(out: &mut String, results: &ResultSet) {
    let failed = results
        .entries
        .iter()
        .filter(|e| e.outcome.is_failed())
        .count();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
    let _ = writeln!(out, "[SUMMARY]");
    let _ = writeln!(out, "    Fiscal years: {}", results.entries.len());
    let _ = writeln!(out, "    Documents: {}", results.total_documents());
    let _ = writeln!(out, "    Failed searches: {failed}");
}
