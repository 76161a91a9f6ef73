use crate::boundary::BoundaryWarning;
use crate::domain::{
    bump_version, parse_version, DependencyKind, DependencyUpdate, PackageSet, UpdatePlan,
    VersionChange, VersionSpecifier,
};
use crate::error::{ChangelogError, Result};
use crate::workspace::ManifestStore;
use indexmap::IndexMap;

/// Outcome of applying a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedPlan {
    pub changes: Vec<VersionChange>,
    /// Per package, the dependencies that moved to a new version in this run
    pub dependency_updates: IndexMap<String, Vec<DependencyUpdate>>,
}

/// Writes planned versions into the manifests
///
/// Every change is computed and validated before the first write. Once a
/// manifest is written it is not rolled back if a later write fails.
pub struct VersionApplier<S: ManifestStore> {
    store: S,
}

impl<S: ManifestStore> VersionApplier<S> {
    pub fn new(store: S) -> Self {
        VersionApplier { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Old and new version of every planned package, without any I/O
    pub fn compute_changes(packages: &PackageSet, plan: &UpdatePlan) -> Result<Vec<VersionChange>> {
        let mut changes = Vec::with_capacity(plan.len());
        for strategy in plan.strategies() {
            let Some(package) = packages.get(&strategy.package) else {
                BoundaryWarning::UnknownPackage {
                    name: strategy.package.clone(),
                }
                .emit();
                continue;
            };

            let old_version = parse_version(&package.name, &package.version)?;
            let new_version = bump_version(&old_version, strategy.bump);
            changes.push(VersionChange {
                package: package.name.clone(),
                old_version,
                new_version,
                bump: strategy.bump,
            });
        }
        Ok(changes)
    }

    /// Compute and apply the changes of `plan`
    pub fn apply(&self, packages: &mut PackageSet, plan: &UpdatePlan) -> Result<AppliedPlan> {
        let changes = Self::compute_changes(packages, plan)?;
        self.apply_changes(packages, &changes)
    }

    /// Write new versions, then rewrite the specifiers that point at them
    ///
    /// `workspace:*`, `workspace:^` and `workspace:~` are never touched;
    /// `workspace:<version>` keeps its prefix; concrete ranges become the
    /// bare new version. External specifiers are left alone with a warning.
    pub fn apply_changes(
        &self,
        packages: &mut PackageSet,
        changes: &[VersionChange],
    ) -> Result<AppliedPlan> {
        for change in changes {
            Self::validate(packages, change)?;
        }

        for change in changes {
            if let Some(package) = packages.get_mut(&change.package) {
                package.version = change.new_version.to_string();
                self.store.save(package)?;
                tracing::debug!(%change, "version written");
            }
        }

        let bumped: IndexMap<&str, &VersionChange> =
            changes.iter().map(|c| (c.package.as_str(), c)).collect();
        let mut dependency_updates = IndexMap::new();

        for package in packages.iter_mut() {
            let name = package.name.clone();
            let mut updates: Vec<DependencyUpdate> = Vec::new();
            let mut rewritten = false;

            for kind in DependencyKind::ALL {
                for (dependency, specifier) in package.dependency_table_mut(kind).iter_mut() {
                    let Some(change) = bumped.get(dependency.as_str()) else {
                        continue;
                    };
                    if *dependency == name {
                        continue;
                    }

                    if !updates.iter().any(|u| u.dependency == *dependency) {
                        updates.push(DependencyUpdate {
                            dependency: dependency.clone(),
                            from: change.old_version.clone(),
                            to: change.new_version.clone(),
                        });
                    }

                    match specifier.rewritten(&change.new_version) {
                        Some(next) => {
                            tracing::debug!(
                                package = %name,
                                dependency = %dependency,
                                from = %specifier,
                                to = %next,
                                "specifier rewritten"
                            );
                            *specifier = next;
                            rewritten = true;
                        }
                        None => {
                            if let VersionSpecifier::External(raw) = specifier {
                                BoundaryWarning::SpecifierNotRewritten {
                                    package: name.clone(),
                                    dependency: dependency.clone(),
                                    specifier: raw.clone(),
                                }
                                .emit();
                            }
                        }
                    }
                }
            }

            if rewritten {
                self.store.save(package)?;
            }
            if !updates.is_empty() {
                dependency_updates.insert(name, updates);
            }
        }

        Ok(AppliedPlan {
            changes: changes.to_vec(),
            dependency_updates,
        })
    }

    fn validate(packages: &PackageSet, change: &VersionChange) -> Result<()> {
        if !packages.contains(&change.package) {
            return Err(ChangelogError::manifest(format!(
                "package '{}' is not part of the workspace, cannot apply {} -> {}",
                change.package, change.old_version, change.new_version
            )));
        }
        if change.new_version <= change.old_version {
            return Err(ChangelogError::version(format!(
                "package '{}': {} -> {} is not an increase",
                change.package, change.old_version, change.new_version
            )));
        }
        Ok(())
    }
}
