use crate::analyzer::BumpCalculator;
use crate::domain::{BumpType, Commit, PackageSet, UpdatePlan, UpdateReason, UpdateStrategy};
use crate::workspace::DependencyGraph;
use indexmap::{IndexMap, IndexSet};

/// Direct targets plus every package that transitively depends on one
///
/// Depth-first over the dependents relation, in discovery order. Each
/// package is visited once, so cycles terminate. Names the graph does not
/// know are skipped.
pub fn expand<I, S>(graph: &DependencyGraph, targets: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut visited = IndexSet::new();
    for target in targets {
        let target = target.as_ref();
        if !graph.contains(target) {
            tracing::debug!(package = target, "not in the dependency graph, skipping");
            continue;
        }
        visit(graph, target, &mut visited);
    }
    visited
}

fn visit(graph: &DependencyGraph, package: &str, visited: &mut IndexSet<String>) {
    if !visited.insert(package.to_string()) {
        return;
    }
    for dependent in graph.dependents_of(package) {
        visit(graph, dependent, visited);
    }
}

/// Builds the update plan of one run
pub struct UpdatePlanner<'a> {
    packages: &'a PackageSet,
    graph: &'a DependencyGraph,
}

impl<'a> UpdatePlanner<'a> {
    pub fn new(packages: &'a PackageSet, graph: &'a DependencyGraph) -> Self {
        UpdatePlanner { packages, graph }
    }

    /// One strategy per package in the expansion of `targets`
    ///
    /// Each bump comes from that package's own pending commits (none means
    /// `patch`) unless `explicit_override` is set, which applies to every
    /// package in the plan.
    pub fn plan(
        &self,
        targets: &IndexSet<String>,
        commits_by_package: &IndexMap<String, Vec<Commit>>,
        explicit_override: Option<BumpType>,
    ) -> UpdatePlan {
        let affected = expand(self.graph, targets);

        let plan: UpdatePlan = affected
            .into_iter()
            .map(|name| {
                let messages: Vec<&str> = commits_by_package
                    .get(&name)
                    .map(|commits| commits.iter().map(|c| c.message.as_str()).collect())
                    .unwrap_or_default();
                let current_version = self
                    .packages
                    .get(&name)
                    .map(|p| p.version.as_str())
                    .unwrap_or_default();

                let bump = BumpCalculator::calculate(current_version, &messages, explicit_override);
                let reason = if targets.contains(&name) {
                    UpdateReason::Direct
                } else {
                    UpdateReason::Dependency
                };

                UpdateStrategy {
                    package: name,
                    bump,
                    reason,
                }
            })
            .collect();

        tracing::debug!(
            targets = targets.len(),
            planned = plan.len(),
            "update plan computed"
        );
        plan
    }
}
