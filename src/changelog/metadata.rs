use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opening line of the metadata comment
pub const METADATA_START: &str = "<!-- changelog-metadata";
pub const METADATA_END: &str = "-->";

/// Record embedded in each changelog; the durable source the cache is
/// rebuilt from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogMetadata {
    pub last_commit_hash: String,
    #[serde(with = "crate::domain::timestamp")]
    pub last_update_time: DateTime<Utc>,
    pub package_name: String,
    pub package_path: String,
}

impl ChangelogMetadata {
    /// The HTML comment holding this record as pretty JSON
    pub fn render(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(format!("{}\n{}\n{}", METADATA_START, json, METADATA_END))
    }

    /// Locate and decode the metadata comment in `text`
    ///
    /// Returns the record and the byte range of the whole comment. `None`
    /// when there is no marker; `Some(Err(..))` when the marker is present
    /// but its content does not decode.
    pub fn find(text: &str) -> Option<(serde_json::Result<Self>, std::ops::Range<usize>)> {
        let start = text.find(METADATA_START)?;
        let body_start = start + METADATA_START.len();
        let body_len = text[body_start..].find(METADATA_END)?;
        let end = body_start + body_len + METADATA_END.len();

        let body = &text[body_start..body_start + body_len];
        Some((serde_json::from_str(body.trim()), start..end))
    }
}
