use crate::changelog::entry::{header_version, ChangelogEntry};
use crate::changelog::metadata::ChangelogMetadata;
use crate::error::{ChangelogError, Result};

pub const TITLE: &str = "# Changelog";

/// A block of the entry list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBlock {
    Parsed(ChangelogEntry),
    /// Hand-written text kept verbatim
    Raw(String),
}

impl EntryBlock {
    /// Version label of the block, if it starts with a version header
    pub fn version(&self) -> Option<&str> {
        match self {
            EntryBlock::Parsed(entry) => Some(&entry.version),
            EntryBlock::Raw(text) => text.lines().next().and_then(header_version),
        }
    }

    /// Whether the block is a release section rather than free text above them
    pub fn is_release(&self) -> bool {
        match self {
            EntryBlock::Parsed(_) => true,
            EntryBlock::Raw(text) => text.starts_with("## "),
        }
    }

    pub fn render(&self) -> String {
        match self {
            EntryBlock::Parsed(entry) => entry.render(),
            EntryBlock::Raw(text) => text.clone(),
        }
    }
}

/// A changelog file: title, metadata record, then entries newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogDocument {
    pub metadata: Option<ChangelogMetadata>,
    pub entries: Vec<EntryBlock>,
}

impl ChangelogDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a changelog
    ///
    /// A missing or undecodable metadata block leaves `metadata` empty. Text
    /// that does not parse as an entry is kept as [EntryBlock::Raw].
    pub fn parse(text: &str) -> Self {
        let mut body = text.to_string();
        let mut metadata = None;

        if let Some((decoded, range)) = ChangelogMetadata::find(text) {
            match decoded {
                Ok(record) => metadata = Some(record),
                Err(e) => tracing::debug!(error = %e, "changelog metadata does not decode"),
            }
            body.replace_range(range, "");
        }

        let mut lines: Vec<&str> = body.lines().collect();
        if let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) {
            if lines[first].trim_end() == TITLE {
                lines.drain(..=first);
            }
        }

        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for line in lines {
            if line.starts_with("## ") || blocks.is_empty() {
                blocks.push(Vec::new());
            }
            if let Some(block) = blocks.last_mut() {
                block.push(line);
            }
        }

        let entries = blocks
            .into_iter()
            .map(|block| block.join("\n").trim().to_string())
            .filter(|text| !text.is_empty())
            .map(|text| match ChangelogEntry::parse(&text) {
                Some(entry) => EntryBlock::Parsed(entry),
                None => EntryBlock::Raw(text),
            })
            .collect();

        ChangelogDocument { metadata, entries }
    }

    pub fn render(&self) -> Result<String> {
        let mut out = format!("{}\n\n", TITLE);

        if let Some(metadata) = &self.metadata {
            let block = metadata
                .render()
                .map_err(|e| ChangelogError::changelog(e.to_string()))?;
            out.push_str(&block);
            out.push_str("\n\n");
        }

        for block in &self.entries {
            out.push_str(block.render().trim_end());
            out.push_str("\n\n");
        }

        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
        Ok(out)
    }

    /// Replace the entry with the same version, or add it above the newest one
    pub fn upsert(&mut self, entry: ChangelogEntry) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|block| block.version() == Some(entry.version.as_str()))
        {
            *existing = EntryBlock::Parsed(entry);
            return;
        }

        let position = self
            .entries
            .iter()
            .position(EntryBlock::is_release)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, EntryBlock::Parsed(entry));
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(EntryBlock::version)
    }
}
