//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, Write};

use anyhow::Result;
use console::style;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_applied, display_boundary_warning, display_cache_status, display_conflicts,
    display_error, display_pending, display_plan, display_status, display_success,
};

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive). Default is "no".
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let response = input.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// Prompts user to pick packages to update.
///
/// Shows a numbered list; the answer is a comma or space separated list of
/// 1-based indices, or `a`/`all`. Enter selects everything.
///
/// # Returns
/// * `Ok(Vec<String>)` - The selected package names, in list order
/// * `Err` - If an index is out of range or not a number
pub fn select_packages(candidates: &[String]) -> Result<Vec<String>> {
    if candidates.len() == 1 {
        return Ok(candidates.to_vec());
    }

    println!("\n{}", style("Packages with pending changes:").bold());
    for (i, name) in candidates.iter().enumerate() {
        println!("  {}. {}", i + 1, name);
    }

    print!("\nSelect packages (e.g. 1,3 or 'all') [default: all]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    parse_selection(input.trim(), candidates)
}

/// Resolve a selection answer against `candidates`
pub fn parse_selection(answer: &str, candidates: &[String]) -> Result<Vec<String>> {
    let answer = answer.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case("a") || answer.eq_ignore_ascii_case("all") {
        return Ok(candidates.to_vec());
    }

    let mut picked = Vec::new();
    for token in answer.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let index: usize = token
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid selection '{}'", token))?;
        if index == 0 || index > candidates.len() {
            return Err(anyhow::anyhow!(
                "Selection {} is out of range (1-{})",
                index,
                candidates.len()
            ));
        }
        picked.push(index - 1);
    }

    picked.sort_unstable();
    picked.dedup();
    Ok(picked.into_iter().map(|i| candidates[i].clone()).collect())
}
