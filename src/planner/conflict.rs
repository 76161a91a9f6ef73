use crate::boundary::BoundaryWarning;
use crate::domain::{bump_version, parse_version, PackageSet, UpdatePlan, VersionSpecifier};
use crate::error::Result;
use crate::workspace::DependencyGraph;
use semver::Version;
use std::fmt;

/// A dependent whose declared range rejects the planned version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub dependent: String,
    pub dependency: String,
    pub required_range: String,
    pub candidate_version: Version,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' requires {}@{}, but {} would become {}",
            self.dependent, self.dependency, self.required_range, self.dependency, self.candidate_version
        )
    }
}

/// Find dependents whose declared ranges the plan would break
///
/// Only concrete semver ranges are checked; `workspace:` and external
/// specifiers never conflict. Fails with a version error if a planned
/// package has an invalid current version. Nothing is mutated.
pub fn check(
    packages: &PackageSet,
    graph: &DependencyGraph,
    plan: &UpdatePlan,
) -> Result<Vec<Conflict>> {
    let mut conflicts = Vec::new();

    for strategy in plan.strategies() {
        let Some(package) = packages.get(&strategy.package) else {
            BoundaryWarning::UnknownPackage {
                name: strategy.package.clone(),
            }
            .emit();
            continue;
        };

        let current = parse_version(&package.name, &package.version)?;
        let candidate = bump_version(&current, strategy.bump);

        for dependent_name in graph.dependents_of(&package.name) {
            if dependent_name == package.name {
                continue;
            }
            let Some(dependent) = packages.get(dependent_name) else {
                continue;
            };

            if let Some(VersionSpecifier::Concrete(range)) =
                dependent.declared_specifier(&package.name)
            {
                if !range.satisfies(&candidate) {
                    let conflict = Conflict {
                        dependent: dependent.name.clone(),
                        dependency: package.name.clone(),
                        required_range: range.as_str().to_string(),
                        candidate_version: candidate.clone(),
                    };
                    tracing::debug!(%conflict, "conflict detected");
                    conflicts.push(conflict);
                }
            }
        }
    }

    Ok(conflicts)
}
