use crate::domain::BumpType;
use indexmap::IndexMap;
use semver::Version;
use std::fmt;

/// Why a package is part of an update plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// Named by the caller
    Direct,
    /// Reached through the dependents of a direct target
    Dependency,
}

impl fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateReason::Direct => f.write_str("direct"),
            UpdateReason::Dependency => f.write_str("dependency"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStrategy {
    pub package: String,
    pub bump: BumpType,
    pub reason: UpdateReason,
}

/// The strategies of one run, at most one per package, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    strategies: IndexMap<String, UpdateStrategy>,
}

impl UpdatePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the strategy for `strategy.package`
    pub fn insert(&mut self, strategy: UpdateStrategy) {
        self.strategies.insert(strategy.package.clone(), strategy);
    }

    pub fn get(&self, package: &str) -> Option<&UpdateStrategy> {
        self.strategies.get(package)
    }

    pub fn strategies(&self) -> impl Iterator<Item = &UpdateStrategy> {
        self.strategies.values()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl FromIterator<UpdateStrategy> for UpdatePlan {
    fn from_iter<I: IntoIterator<Item = UpdateStrategy>>(iter: I) -> Self {
        let mut plan = UpdatePlan::new();
        for strategy in iter {
            plan.insert(strategy);
        }
        plan
    }
}

/// Concrete old -> new transition derived from a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub package: String,
    pub old_version: Version,
    pub new_version: Version,
    pub bump: BumpType,
}

impl fmt::Display for VersionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} ({})",
            self.package, self.old_version, self.new_version, self.bump
        )
    }
}

/// A dependency of some package moved to a new version during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    pub dependency: String,
    pub from: Version,
    pub to: Version,
}
