//! Summary lines printed after a workflow finishes

use aidocs_core::{StepOutcome, WorkflowReport};
use colored::Colorize;

pub fn print(report: &WorkflowReport) {
    for line in summary(report) {
        println!("{line}");
    }
}

/// Plain-text summary, one entry per line.
pub fn summary(report: &WorkflowReport) -> Vec<String> {
    let mut lines = Vec::new();

    if report.dry_run {
        let planned = report
            .steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Planned)
            .count();
        lines.push(format!(
            "{} {} step(s) planned, nothing changed",
            "DRY RUN".yellow().bold(),
            planned
        ));
    } else if report.copied + report.linked + report.skipped > 0 {
        lines.push(format!(
            "Files: {} copied, {} linked, {} skipped",
            report.copied, report.linked, report.skipped
        ));
    }

    if let Some(message) = &report.commit {
        lines.push(format!("Commit: {}", message.cyan()));
    }
    if report.pushed {
        lines.push(format!("{} Pushed to remote", "OK".green().bold()));
    }
    for note in &report.notes {
        lines.push(format!("   {} {}", "-".dimmed(), note));
    }

    let warnings = report.warnings();
    if warnings > 0 {
        lines.push(format!(
            "{} Completed with {} warning(s)",
            "WARN".yellow().bold(),
            warnings
        ));
    }
    lines
}
