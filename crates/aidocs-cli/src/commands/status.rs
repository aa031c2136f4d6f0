//! Status output

use aidocs_core::{PathState, StatusReport};
use colored::Colorize;

pub fn print(report: &StatusReport) {
    println!("{}", "AI Docs Status".bold());
    println!();

    let branch_state = if report.branch_exists {
        "exists".green()
    } else {
        "missing".yellow()
    };
    let worktree_state = if report.worktree_exists {
        "exists".green()
    } else {
        "missing".yellow()
    };
    println!(
        "{}: {} ({})",
        "Doc branch".dimmed(),
        report.doc_branch.cyan(),
        branch_state
    );
    println!(
        "{}:   {} ({})",
        "Worktree".dimmed(),
        report.worktree_dir.as_str().cyan(),
        worktree_state
    );
    if let Some(current) = &report.current_branch {
        println!("{}:    {}", "Current".dimmed(), current);
    }
    if report.pending_changes {
        println!(
            "{}:    {}",
            "Changes".dimmed(),
            "uncommitted changes in worktree".yellow()
        );
    }
    println!();

    println!("{}:", "Context Paths".bold());
    if report.paths.is_empty() {
        println!("  {}", "None configured".dimmed());
    }
    for path in &report.paths {
        let state = match path.state {
            PathState::Linked => path.state.to_string().green(),
            PathState::Local => path.state.to_string().normal(),
            PathState::Dangling => path.state.to_string().red(),
            PathState::Missing => path.state.to_string().dimmed(),
        };
        let marker = if path.in_worktree { "+".green() } else { " ".normal() };
        println!(
            "  {} {} {} ({})",
            marker,
            path.agent.cyan(),
            path.path,
            state
        );
    }

    if !report.is_initialized() {
        println!();
        println!("Run {} to set up the doc branch.", "ai-docs init".cyan());
    }
}
