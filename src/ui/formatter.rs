//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use crate::boundary::BoundaryWarning;
use crate::cache::CacheStatus;
use crate::domain::{Commit, UpdatePlan, VersionChange};
use crate::planner::{AppliedPlan, Conflict};
use console::style;
use indexmap::IndexMap;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One line per planned package: `name  old -> new  (bump, reason)`
pub fn format_plan(plan: &UpdatePlan, changes: &[VersionChange]) -> Vec<String> {
    let width = plan
        .strategies()
        .map(|s| s.package.len())
        .max()
        .unwrap_or(0);

    plan.strategies()
        .map(|strategy| {
            let transition = changes
                .iter()
                .find(|c| c.package == strategy.package)
                .map(|c| format!("{} -> {}", c.old_version, c.new_version))
                .unwrap_or_else(|| "?".to_string());
            format!(
                "{:<width$}  {}  ({}, {})",
                strategy.package,
                transition,
                strategy.bump,
                strategy.reason,
                width = width
            )
        })
        .collect()
}

pub fn display_plan(plan: &UpdatePlan, changes: &[VersionChange]) {
    println!("\n{}", style("Update plan:").bold());
    for line in format_plan(plan, changes) {
        println!("  {}", line);
    }
}

pub fn display_conflicts(conflicts: &[Conflict]) {
    eprintln!(
        "\n{}",
        style(format!("{} version conflict(s):", conflicts.len())).red().bold()
    );
    for conflict in conflicts {
        eprintln!("  - {}", conflict);
    }
}

/// Summary of written versions and dependency rewrites
pub fn display_applied(applied: &AppliedPlan) {
    for change in &applied.changes {
        display_success(&format!(
            "{} {} -> {}",
            style(&change.package).bold(),
            style(&change.old_version).red(),
            style(&change.new_version).green()
        ));
    }
    for (package, updates) in &applied.dependency_updates {
        for update in updates {
            println!(
                "    {} {}: {} -> {}",
                style("↳").dim(),
                package,
                update.dependency,
                update.to
            );
        }
    }
}

pub fn display_cache_status(status: &CacheStatus) {
    println!("{}", style("Cache:").bold());
    if !status.exists {
        println!("  {}", style("not initialised").yellow());
        return;
    }
    let validity = if status.valid {
        style("valid").green()
    } else {
        style("expired").yellow()
    };
    println!("  status:      {}", validity);
    if let Some(time) = status.last_update_time {
        println!("  last update: {}", time.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("  packages:    {}", status.package_count);
}

/// `name: N commit(s)` per package with pending commits
pub fn format_pending_summary(pending: &IndexMap<String, Vec<Commit>>) -> Vec<String> {
    pending
        .iter()
        .filter(|(_, commits)| !commits.is_empty())
        .map(|(name, commits)| format!("{}: {} commit(s)", name, commits.len()))
        .collect()
}

/// Display pending commits per package; `verbose` lists each commit
pub fn display_pending(pending: &IndexMap<String, Vec<Commit>>, verbose: bool) {
    println!("\n{}", style("Pending changes:").bold());
    let summary = format_pending_summary(pending);
    if summary.is_empty() {
        println!("  none");
        return;
    }

    for (name, commits) in pending.iter().filter(|(_, c)| !c.is_empty()) {
        println!("  {}: {} commit(s)", style(name).cyan(), commits.len());
        if verbose {
            for commit in commits {
                let subject = commit.subject();
                let short: String = subject.chars().take(72).collect();
                println!("    {} {}", style(commit.short_hash()).dim(), short);
            }
        }
    }
}
