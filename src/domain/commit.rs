use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// A commit as supplied by the source-control log reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    /// Repo-relative paths changed by this commit
    pub files: Vec<String>,
    /// Leading conventional-commit token (`feat`, `fix`, ...), if any
    pub commit_type: Option<String>,
}

impl Commit {
    /// Build a commit record, deriving the type tag from the message header
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
        files: Vec<String>,
    ) -> Self {
        let message = message.into();
        let commit_type = ParsedCommit::parse_header(&message).map(|parsed| parsed.r#type);
        Commit {
            hash: hash.into(),
            message,
            author: author.into(),
            timestamp,
            files,
            commit_type,
        }
    }

    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map_or(self.hash.len(), |(i, _)| i);
        &self.hash[..end]
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    pub fn parsed(&self) -> ParsedCommit {
        ParsedCommit::parse(&self.message)
    }
}

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| Regex::new(r"^([a-zA-Z]+)(?:\(([^)]*)\))?(!?):\s*(.*)").ok())
        .as_ref()
}

impl ParsedCommit {
    /// Parse a commit message in Conventional Commits format
    /// Supports formats:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    /// - non-conventional text (reported as `chore`)
    pub fn parse(message: &str) -> Self {
        Self::parse_header(message).unwrap_or_else(|| ParsedCommit {
            r#type: "chore".to_string(),
            scope: None,
            description: message.lines().next().unwrap_or("").trim().to_string(),
            is_breaking_change: message.contains("BREAKING CHANGE"),
        })
    }

    /// Parse only a conventional header; `None` for free-form messages
    pub fn parse_header(message: &str) -> Option<Self> {
        let subject = message.lines().next().unwrap_or("");
        let captures = header_regex()?.captures(subject)?;

        let r#type = captures.get(1)?.as_str().to_ascii_lowercase();
        let scope = captures
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());
        let has_exclamation = captures.get(3).map(|m| m.as_str()) == Some("!");
        let description = captures
            .get(4)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        Some(ParsedCommit {
            r#type,
            scope,
            description,
            is_breaking_change: has_exclamation || message.contains("BREAKING CHANGE"),
        })
    }
}
