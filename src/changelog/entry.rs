use crate::domain::{Commit, DependencyUpdate, ParsedCommit};
use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Section headings of an entry, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Breaking,
    Features,
    BugFixes,
    Performance,
    Refactoring,
    Documentation,
    Styles,
    Tests,
    Build,
    Ci,
    Chores,
    Reverts,
    Other,
    Dependencies,
}

impl Section {
    pub const ALL: [Section; 14] = [
        Section::Breaking,
        Section::Features,
        Section::BugFixes,
        Section::Performance,
        Section::Refactoring,
        Section::Documentation,
        Section::Styles,
        Section::Tests,
        Section::Build,
        Section::Ci,
        Section::Chores,
        Section::Reverts,
        Section::Other,
        Section::Dependencies,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Breaking => "BREAKING CHANGES",
            Section::Features => "Features",
            Section::BugFixes => "Bug Fixes",
            Section::Performance => "Performance Improvements",
            Section::Refactoring => "Code Refactoring",
            Section::Documentation => "Documentation",
            Section::Styles => "Styles",
            Section::Tests => "Tests",
            Section::Build => "Build System",
            Section::Ci => "Continuous Integration",
            Section::Chores => "Chores",
            Section::Reverts => "Reverts",
            Section::Other => "Other Changes",
            Section::Dependencies => "Dependencies",
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        Section::ALL.into_iter().find(|s| s.title() == title)
    }

    /// Section a commit is listed under
    pub fn for_commit(commit: &ParsedCommit) -> Self {
        if commit.is_breaking_change {
            return Section::Breaking;
        }
        match commit.r#type.as_str() {
            "feat" => Section::Features,
            "fix" => Section::BugFixes,
            "perf" => Section::Performance,
            "refactor" => Section::Refactoring,
            "docs" => Section::Documentation,
            "style" => Section::Styles,
            "test" => Section::Tests,
            "build" => Section::Build,
            "ci" => Section::Ci,
            "chore" => Section::Chores,
            "revert" => Section::Reverts,
            _ => Section::Other,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySection {
    pub section: Section,
    /// Item text without the leading `- `
    pub items: Vec<String>,
}

/// One released version of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub version: String,
    pub date: Option<NaiveDate>,
    pub sections: Vec<EntrySection>,
}

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| Regex::new(r"^## \[([^\]]+)\](?: - (\d{4}-\d{2}-\d{2}))?\s*$").ok())
        .as_ref()
}

/// Version label of a `## [x.y.z]` header line
pub fn header_version(line: &str) -> Option<&str> {
    header_regex()?
        .captures(line.trim_end())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

impl ChangelogEntry {
    /// Group commits and dependency updates into sections
    pub fn from_commits(
        version: impl Into<String>,
        date: NaiveDate,
        commits: &[Commit],
        dependency_updates: &[DependencyUpdate],
    ) -> Self {
        let mut entry = ChangelogEntry {
            version: version.into(),
            date: Some(date),
            sections: Vec::new(),
        };

        for commit in commits {
            let parsed = commit.parsed();
            let text = match &parsed.scope {
                Some(scope) => format!("**{}:** {} ({})", scope, parsed.description, commit.short_hash()),
                None => format!("{} ({})", parsed.description, commit.short_hash()),
            };
            entry.push(Section::for_commit(&parsed), text);
        }

        for update in dependency_updates {
            entry.push(
                Section::Dependencies,
                format!(
                    "Updated dependency `{}` from {} to {}",
                    update.dependency, update.from, update.to
                ),
            );
        }

        entry
            .sections
            .sort_by_key(|s| Section::ALL.iter().position(|x| *x == s.section));
        entry
    }

    fn push(&mut self, section: Section, item: String) {
        match self.sections.iter_mut().find(|s| s.section == section) {
            Some(existing) => existing.items.push(item),
            None => self.sections.push(EntrySection {
                section,
                items: vec![item],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.items.is_empty())
    }

    pub fn render(&self) -> String {
        let mut out = format!("## [{}]", self.version);
        if let Some(date) = self.date {
            out.push_str(&format!(" - {}", date.format("%Y-%m-%d")));
        }
        out.push('\n');

        if self.is_empty() {
            out.push_str("\nNo notable changes.\n");
            return out;
        }

        for section in self.sections.iter().filter(|s| !s.items.is_empty()) {
            out.push_str(&format!("\n### {}\n\n", section.section));
            for item in &section.items {
                out.push_str(&format!("- {}\n", item));
            }
        }
        out
    }

    /// Inverse of [ChangelogEntry::render]; `None` for text it would not produce
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines();
        let header = lines.next()?;
        let captures = header_regex()?.captures(header.trim_end())?;

        let version = captures.get(1)?.as_str().to_string();
        let date = match captures.get(2) {
            Some(m) => Some(NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok()?),
            None => None,
        };

        let mut entry = ChangelogEntry {
            version,
            date,
            sections: Vec::new(),
        };

        for line in lines {
            let line = line.trim_end();
            if line.is_empty() || line == "No notable changes." {
                continue;
            }
            if let Some(title) = line.strip_prefix("### ") {
                let section = Section::from_title(title.trim())?;
                if entry.sections.iter().any(|s| s.section == section) {
                    return None;
                }
                entry.sections.push(EntrySection {
                    section,
                    items: Vec::new(),
                });
            } else if let Some(item) = line.strip_prefix("- ") {
                entry.sections.last_mut()?.items.push(item.to_string());
            } else {
                return None;
            }
        }

        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use semver::Version;

    fn commit(hash: &str, message: &str) -> Commit {
        Commit::new(hash, message, "dev", Utc::now(), vec![])
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn sample() -> ChangelogEntry {
        ChangelogEntry::from_commits(
            "1.1.0",
            date(),
            &[
                commit("1111111aaaa", "fix(parser): handle tabs"),
                commit("2222222bbbb", "feat: add watch mode"),
                commit("3333333cccc", "feat(api)!: drop v1 endpoints"),
                commit("4444444dddd", "tidy things up"),
            ],
            &[DependencyUpdate {
                dependency: "core".to_string(),
                from: Version::new(1, 0, 0),
                to: Version::new(1, 0, 1),
            }],
        )
    }

    #[test]
    fn test_from_commits_groups_in_section_order() {
        let entry = sample();
        let titles: Vec<&str> = entry.sections.iter().map(|s| s.section.title()).collect();
        assert_eq!(
            titles,
            vec!["BREAKING CHANGES", "Features", "Bug Fixes", "Chores", "Dependencies"]
        );
        assert_eq!(entry.sections[0].items, vec!["**api:** drop v1 endpoints (3333333)"]);
        assert_eq!(entry.sections[2].items, vec!["**parser:** handle tabs (1111111)"]);
    }

    #[test]
    fn test_render_layout() {
        let rendered = sample().render();
        let expected = "\
## [1.1.0] - 2024-05-01

### BREAKING CHANGES

- **api:** drop v1 endpoints (3333333)

### Features

- add watch mode (2222222)

### Bug Fixes

- **parser:** handle tabs (1111111)

### Chores

- tidy things up (4444444)

### Dependencies

- Updated dependency `core` from 1.0.0 to 1.0.1
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_parse_inverts_render() {
        let entry = sample();
        assert_eq!(ChangelogEntry::parse(&entry.render()), Some(entry));

        let dependency_only = ChangelogEntry::from_commits(
            "2.0.1",
            date(),
            &[],
            &[DependencyUpdate {
                dependency: "b".to_string(),
                from: Version::new(2, 0, 0),
                to: Version::new(3, 0, 0),
            }],
        );
        assert_eq!(
            ChangelogEntry::parse(&dependency_only.render()),
            Some(dependency_only)
        );
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert!(ChangelogEntry::parse("## [1.0.0]\n\nInitial release, see README.\n").is_none());
        assert!(ChangelogEntry::parse("## [1.0.0]\n\n### Unknown\n\n- x\n").is_none());
        assert!(ChangelogEntry::parse("not a header").is_none());
    }

    #[test]
    fn test_header_version() {
        assert_eq!(header_version("## [1.2.3] - 2024-01-01"), Some("1.2.3"));
        assert_eq!(header_version("## [2.0.0-rc.1]"), Some("2.0.0-rc.1"));
        assert_eq!(header_version("### Features"), None);
    }
}
