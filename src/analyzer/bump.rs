use crate::domain::{BumpType, ParsedCommit};

/// Derives a bump type from commit messages
pub struct BumpCalculator;

impl BumpCalculator {
    /// Bump type for a package at `current_version` given its pending commit
    /// messages.
    ///
    /// First match wins:
    /// 1. an explicit override, without looking at the messages
    /// 2. `major` if any message contains `BREAKING CHANGE` or `!:`, or has a
    ///    conventional header with `!` before the colon
    /// 3. `minor` if any message starts with `feat:` or `feat(`
    /// 4. `patch`
    pub fn calculate<S: AsRef<str>>(
        current_version: &str,
        messages: &[S],
        explicit_override: Option<BumpType>,
    ) -> BumpType {
        if let Some(bump) = explicit_override {
            tracing::debug!(current_version, %bump, "explicit bump type");
            return bump;
        }

        let messages: Vec<&str> = messages.iter().map(AsRef::as_ref).collect();

        let bump = if messages.iter().any(|m| Self::is_breaking(m)) {
            BumpType::Major
        } else if messages
            .iter()
            .any(|m| m.starts_with("feat:") || m.starts_with("feat("))
        {
            BumpType::Minor
        } else {
            BumpType::Patch
        };

        tracing::debug!(current_version, commits = messages.len(), %bump, "bump type derived");
        bump
    }

    fn is_breaking(message: &str) -> bool {
        message.contains("BREAKING CHANGE")
            || message.contains("!:")
            || ParsedCommit::parse_header(message).is_some_and(|p| p.is_breaking_change)
    }
}
