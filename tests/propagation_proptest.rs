//! Property-based tests for dependent propagation.
//!
//! - The expansion contains every target and is closed under "depends on"
//! - Nothing outside the reverse reachability set is added
//! - Expanding an expansion changes nothing, cycles included

use indexmap::{IndexMap, IndexSet};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use workspace_changelog::domain::{BumpType, DependencyKind, Package, PackageSet, UpdateReason};
use workspace_changelog::planner::{expand, UpdatePlanner};
use workspace_changelog::workspace::DependencyGraph;

// =============================================================================
// Strategies
// =============================================================================

fn name(i: usize) -> String {
    format!("pkg_{i}")
}

/// Package count plus arbitrary `dependent -> dependency` edges; cycles allowed
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..=10).prop_flat_map(|count| {
        let edges = proptest::collection::vec((0..count, 0..count), 0..=count * 2);
        (Just(count), edges)
    })
}

fn targets_strategy(count: usize) -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..count, 1..=count.min(4))
}

fn build_packages(count: usize, edges: &[(usize, usize)]) -> PackageSet {
    let packages = (0..count)
        .map(|i| {
            let mut package = Package::new(name(i), "1.0.0", format!("/ws/{}", name(i)), name(i));
            for (dependent, dependency) in edges {
                if *dependent == i && dependent != dependency {
                    package = package.with_dependency(
                        DependencyKind::Runtime,
                        &name(*dependency),
                        "^1.0.0",
                    );
                }
            }
            package
        })
        .collect();
    PackageSet::new(packages)
}

/// Reference answer: breadth-first over reversed edges
fn reachable(count: usize, edges: &[(usize, usize)], targets: &[usize]) -> HashSet<String> {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut queue: VecDeque<usize> = targets.iter().copied().collect();
    while let Some(current) = queue.pop_front() {
        if current >= count || !seen.insert(current) {
            continue;
        }
        for (dependent, dependency) in edges {
            if *dependency == current && dependent != dependency {
                queue.push_back(*dependent);
            }
        }
    }
    seen.into_iter().map(name).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn expansion_matches_reverse_reachability(
        (count, edges, targets) in graph_strategy()
            .prop_flat_map(|(count, edges)| (Just(count), Just(edges), targets_strategy(count)))
    ) {
        let packages = build_packages(count, &edges);
        let graph = DependencyGraph::build(&packages);
        let target_names: Vec<String> = targets.iter().map(|i| name(*i)).collect();

        let expanded = expand(&graph, &target_names);
        let expanded_set: HashSet<String> = expanded.iter().cloned().collect();

        prop_assert_eq!(expanded.len(), expanded_set.len(), "no duplicates");
        prop_assert_eq!(&expanded_set, &reachable(count, &edges, &targets));
        for target in &target_names {
            prop_assert!(expanded_set.contains(target));
        }
        for package in &expanded {
            for dependent in graph.dependents_of(package) {
                prop_assert!(expanded_set.contains(dependent), "{} missing", dependent);
            }
        }
    }

    #[test]
    fn expansion_is_idempotent(
        (count, edges, targets) in graph_strategy()
            .prop_flat_map(|(count, edges)| (Just(count), Just(edges), targets_strategy(count)))
    ) {
        let packages = build_packages(count, &edges);
        let graph = DependencyGraph::build(&packages);
        let target_names: Vec<String> = targets.iter().map(|i| name(*i)).collect();

        let once = expand(&graph, &target_names);
        let twice = expand(&graph, &once);
        let once_set: HashSet<&String> = once.iter().collect();
        let twice_set: HashSet<&String> = twice.iter().collect();
        prop_assert_eq!(once_set, twice_set);
    }

    #[test]
    fn plan_marks_only_targets_direct(
        (count, edges, targets) in graph_strategy()
            .prop_flat_map(|(count, edges)| (Just(count), Just(edges), targets_strategy(count)))
    ) {
        let packages = build_packages(count, &edges);
        let graph = DependencyGraph::build(&packages);
        let target_set: IndexSet<String> = targets.iter().map(|i| name(*i)).collect();

        let plan = UpdatePlanner::new(&packages, &graph).plan(&target_set, &IndexMap::new(), None);

        prop_assert_eq!(plan.len(), reachable(count, &edges, &targets).len());
        for strategy in plan.strategies() {
            prop_assert_eq!(strategy.bump, BumpType::Patch);
            let expected = if target_set.contains(&strategy.package) {
                UpdateReason::Direct
            } else {
                UpdateReason::Dependency
            };
            prop_assert_eq!(strategy.reason, expected);
        }
    }
}
