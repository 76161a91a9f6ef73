//! Dependency version specifiers, classified once when a manifest is read.
//!
//! Every specifier string found in a manifest becomes one of four variants.
//! The rewrite rules applied after a version bump are a single match on
//! the variant instead of string comparisons scattered over call sites.

use semver::{Comparator, Op, Version, VersionReq};
use std::fmt;

const WORKSPACE_PREFIX: &str = "workspace:";

/// The three `workspace:` forms that always follow the sibling's version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    /// `workspace:*`
    Any,
    /// `workspace:^`
    Caret,
    /// `workspace:~`
    Tilde,
}

impl Wildcard {
    fn symbol(&self) -> char {
        match self {
            Wildcard::Any => '*',
            Wildcard::Caret => '^',
            Wildcard::Tilde => '~',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpecifier {
    /// A registry-style semver range (`1.0.0`, `^1.2.0`, `>=1 <3`, ...)
    Concrete(NpmRange),
    /// `workspace:*`, `workspace:^` or `workspace:~`; never rewritten
    WorkspaceWildcard(Wildcard),
    /// `workspace:<version>`; only the version part is rewritten
    WorkspaceExact(String),
    /// Anything else (`file:`, `link:`, git URLs, dist-tags)
    External(String),
}

impl VersionSpecifier {
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(WORKSPACE_PREFIX) {
            return match rest {
                "*" => VersionSpecifier::WorkspaceWildcard(Wildcard::Any),
                "^" => VersionSpecifier::WorkspaceWildcard(Wildcard::Caret),
                "~" => VersionSpecifier::WorkspaceWildcard(Wildcard::Tilde),
                version => VersionSpecifier::WorkspaceExact(version.to_string()),
            };
        }

        match NpmRange::parse(raw) {
            Some(range) => VersionSpecifier::Concrete(range),
            None => VersionSpecifier::External(raw.to_string()),
        }
    }

    /// The specifier to write after the dependency moved to `new_version`.
    ///
    /// `None` means the specifier stays byte-identical.
    pub fn rewritten(&self, new_version: &Version) -> Option<VersionSpecifier> {
        match self {
            VersionSpecifier::WorkspaceWildcard(_) | VersionSpecifier::External(_) => None,
            VersionSpecifier::WorkspaceExact(current) => {
                let operator: String = current
                    .chars()
                    .take_while(|c| matches!(c, '^' | '~'))
                    .collect();
                Some(VersionSpecifier::WorkspaceExact(format!(
                    "{}{}",
                    operator, new_version
                )))
            }
            VersionSpecifier::Concrete(_) => {
                Some(VersionSpecifier::Concrete(NpmRange::exact(new_version)))
            }
        }
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpecifier::Concrete(range) => f.write_str(range.as_str()),
            VersionSpecifier::WorkspaceWildcard(wildcard) => {
                write!(f, "{}{}", WORKSPACE_PREFIX, wildcard.symbol())
            }
            VersionSpecifier::WorkspaceExact(version) => {
                write!(f, "{}{}", WORKSPACE_PREFIX, version)
            }
            VersionSpecifier::External(raw) => f.write_str(raw),
        }
    }
}

/// An npm-style range: `||` alternatives of whitespace-separated comparator
/// sets, where a bare version means exactly that version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut alternatives = Vec::new();
        for set in raw.split("||") {
            let translated = translate_set(set)?;
            alternatives.push(VersionReq::parse(&translated).ok()?);
        }

        Some(NpmRange {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// A range matching exactly `version`, written as the bare version
    pub fn exact(version: &Version) -> Self {
        let comparator = Comparator {
            op: Op::Exact,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        };

        NpmRange {
            raw: version.to_string(),
            alternatives: vec![VersionReq {
                comparators: vec![comparator],
            }],
        }
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Translate one npm comparator set into `semver::VersionReq` syntax
fn translate_set(set: &str) -> Option<String> {
    let set = set.trim();
    if set.is_empty() {
        return Some("*".to_string());
    }

    if let Some((low, high)) = set.split_once(" - ") {
        let low = strip_version_prefix(low.trim())?;
        let high = strip_version_prefix(high.trim())?;
        return Some(format!(">={}, <={}", low, high));
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in set.split_whitespace() {
        if token.chars().all(is_operator_char) {
            pending_op = Some(token);
            continue;
        }
        let token = match pending_op.take() {
            Some(op) => format!("{}{}", op, token),
            None => token.to_string(),
        };
        comparators.push(translate_comparator(&token)?);
    }

    if pending_op.is_some() {
        return None;
    }

    Some(comparators.join(", "))
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '~' | '^')
}

fn translate_comparator(token: &str) -> Option<String> {
    let split = token.find(|c: char| !is_operator_char(c))?;
    let (op, rest) = token.split_at(split);
    let rest = strip_version_prefix(rest)?;

    if is_wildcard(rest) {
        return Some("*".to_string());
    }

    let has_wildcard_part = rest.split('.').any(is_wildcard);
    // `~>` is an alias of `~`
    let op = if op == "~>" { "~" } else { op };
    match op {
        "" if has_wildcard_part => Some(rest.to_string()),
        "" | "=" => Some(format!("={}", rest)),
        _ => Some(format!("{}{}", op, rest)),
    }
}

fn strip_version_prefix(version: &str) -> Option<&str> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let starts_ok = version
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '*' || c == 'x' || c == 'X')?;
    starts_ok.then_some(version)
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}
