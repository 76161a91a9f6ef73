use crate::boundary::BoundaryWarning;
use crate::domain::{Commit, PackageSet};
use indexmap::{IndexMap, IndexSet};

/// Which packages the caller asked to update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    /// Every package with pending commits
    All,
    Named(Vec<String>),
}

/// Turn a selection into the set of direct targets
///
/// Unknown names are logged and dropped.
pub fn resolve_targets(
    selection: &TargetSelection,
    packages: &PackageSet,
    pending: &IndexMap<String, Vec<Commit>>,
) -> IndexSet<String> {
    match selection {
        TargetSelection::All => pending
            .iter()
            .filter(|(name, commits)| !commits.is_empty() && packages.contains(name))
            .map(|(name, _)| name.clone())
            .collect(),
        TargetSelection::Named(names) => names
            .iter()
            .filter(|name| {
                let known = packages.contains(name);
                if !known {
                    BoundaryWarning::UnknownPackage {
                        name: name.to_string(),
                    }
                    .emit();
                }
                known
            })
            .cloned()
            .collect(),
    }
}
