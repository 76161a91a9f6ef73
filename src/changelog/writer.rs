use crate::boundary::BoundaryWarning;
use crate::changelog::{ChangelogDocument, ChangelogEntry, ChangelogMetadata};
use crate::domain::Package;
use crate::error::{ChangelogError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads and merges per-package changelog files
#[derive(Debug, Clone)]
pub struct ChangelogWriter {
    file_name: String,
}

impl ChangelogWriter {
    pub fn new(file_name: impl Into<String>) -> Self {
        ChangelogWriter {
            file_name: file_name.into(),
        }
    }

    pub fn path_for(&self, package: &Package) -> PathBuf {
        package.path.join(&self.file_name)
    }

    /// The parsed changelog of `package`, `None` if it has none yet
    pub fn read(&self, package: &Package) -> Result<Option<ChangelogDocument>> {
        let path = self.path_for(package);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(ChangelogDocument::parse(&text))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChangelogError::changelog(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Metadata record of the changelog of `package`
    ///
    /// Never fails: unreadable files and missing or corrupt blocks log a
    /// warning and yield `None`.
    pub fn read_metadata(&self, package: &Package) -> Option<ChangelogMetadata> {
        match self.read(package) {
            Ok(Some(document)) => {
                if document.metadata.is_none() {
                    BoundaryWarning::ChangelogMetadataMissing {
                        package: package.name.clone(),
                    }
                    .emit();
                }
                document.metadata
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(package = %package.name, error = %e, "changelog unreadable");
                None
            }
        }
    }

    /// Merge `entry` into the changelog of `package`, creating the file if needed
    ///
    /// The metadata block is replaced; an entry with the same version is
    /// replaced, otherwise the new entry goes above the previous newest one.
    pub fn write_entry(
        &self,
        package: &Package,
        entry: ChangelogEntry,
        metadata: ChangelogMetadata,
    ) -> Result<PathBuf> {
        let path = self.path_for(package);
        let mut document = match self.read(package)? {
            Some(existing) => {
                if existing.metadata.is_none() {
                    BoundaryWarning::ChangelogMetadataMissing {
                        package: package.name.clone(),
                    }
                    .emit();
                }
                existing
            }
            None => ChangelogDocument::new(),
        };

        let version = entry.version.clone();
        document.upsert(entry);
        document.metadata = Some(metadata);

        fs::write(&path, document.render()?).map_err(|e| {
            ChangelogError::changelog(format!(
                "cannot write {} for '{}' {}: {}",
                path.display(),
                package.name,
                version,
                e
            ))
        })?;

        tracing::debug!(package = %package.name, %version, path = %path.display(), "changelog written");
        Ok(path)
    }
}
