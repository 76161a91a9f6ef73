use std::fmt;

/// Non-fatal conditions met while reading the workspace, the history, the
/// cache or existing changelogs. Each one is logged and the run continues
/// with a safe default.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A requested target is not a workspace member; it is dropped
    UnknownPackage { name: String },
    /// Two members declare the same name; the later one is ignored
    DuplicatePackage { name: String, path: String },
    /// A member manifest cannot be read or has no name; the member is skipped
    ManifestUnreadable { path: String, reason: String },
    /// The cache file is missing or corrupt; an empty cache is used
    CacheUnreadable { path: String, reason: String },
    /// A changelog has no usable metadata block
    ChangelogMetadataMissing { package: String },
    /// The changed-file list of a commit could not be read
    CommitFilesUnavailable { hash: String, reason: String },
    /// The cached last commit of a package is not in the history
    CachedCommitNotFound { package: String, hash: String },
    /// A dependency on a bumped package uses a specifier that cannot be rewritten
    SpecifierNotRewritten {
        package: String,
        dependency: String,
        specifier: String,
    },
    /// No package has commits to incorporate
    NoPendingChanges,
}

/// First seven characters; hashes read from a cache file may not be ASCII
fn short(hash: &str) -> &str {
    match hash.char_indices().nth(7) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::UnknownPackage { name } => {
                write!(f, "Package '{}' is not part of the workspace, ignoring it", name)
            }
            BoundaryWarning::DuplicatePackage { name, path } => {
                write!(f, "Duplicate package name '{}' at '{}', ignoring it", name, path)
            }
            BoundaryWarning::ManifestUnreadable { path, reason } => {
                write!(f, "Cannot read manifest '{}': {}", path, reason)
            }
            BoundaryWarning::CacheUnreadable { path, reason } => {
                write!(f, "Cannot read cache '{}': {} (starting empty)", path, reason)
            }
            BoundaryWarning::ChangelogMetadataMissing { package } => {
                write!(f, "Changelog of '{}' has no metadata block", package)
            }
            BoundaryWarning::CommitFilesUnavailable { hash, reason } => {
                write!(
                    f,
                    "Cannot list files of commit {}: {} (treating as empty)",
                    short(hash),
                    reason
                )
            }
            BoundaryWarning::CachedCommitNotFound { package, hash } => {
                write!(
                    f,
                    "Cached commit {} of '{}' is not in the history, using the full history",
                    short(hash),
                    package
                )
            }
            BoundaryWarning::SpecifierNotRewritten {
                package,
                dependency,
                specifier,
            } => {
                write!(
                    f,
                    "'{}' depends on '{}' via '{}', which cannot be rewritten",
                    package, dependency, specifier
                )
            }
            BoundaryWarning::NoPendingChanges => write!(f, "No packages have pending changes"),
        }
    }
}

impl BoundaryWarning {
    /// Log through `tracing`; the CLI subscriber renders it on stderr
    pub fn emit(&self) {
        tracing::warn!("{}", self);
    }
}
