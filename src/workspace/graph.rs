use crate::domain::PackageSet;
use indexmap::{IndexMap, IndexSet};

/// In-repo dependency edges of one package snapshot
///
/// An edge `a -> b` exists when `a` declares `b` in any of its dependency
/// tables and `b` is itself a workspace member. Declarations of names that
/// do not resolve to a member are ignored, whatever their specifier.
/// Cycles are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    dependencies: IndexMap<String, IndexSet<String>>,
    dependents: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    pub fn build(packages: &PackageSet) -> Self {
        let mut graph = DependencyGraph::default();

        for package in packages.iter() {
            graph.dependencies.entry(package.name.clone()).or_default();
            graph.dependents.entry(package.name.clone()).or_default();
        }

        for package in packages.iter() {
            for dependency in package.dependency_names() {
                if !packages.contains(dependency) {
                    continue;
                }
                graph
                    .dependencies
                    .entry(package.name.clone())
                    .or_default()
                    .insert(dependency.to_string());
                graph
                    .dependents
                    .entry(dependency.to_string())
                    .or_default()
                    .insert(package.name.clone());
            }
        }

        tracing::debug!(
            packages = graph.dependencies.len(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        graph
    }

    pub fn contains(&self, package: &str) -> bool {
        self.dependencies.contains_key(package)
    }

    /// Members `package` depends on
    pub fn dependencies_of(&self, package: &str) -> impl Iterator<Item = &str> {
        self.dependencies
            .get(package)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    /// Members that depend on `package`
    pub fn dependents_of(&self, package: &str) -> impl Iterator<Item = &str> {
        self.dependents
            .get(package)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(IndexSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyKind, Package};

    fn package(name: &str) -> Package {
        Package::new(name, "1.0.0", format!("/repo/packages/{}", name), format!("packages/{}", name))
    }

    #[test]
    fn test_edges_only_between_members() {
        let packages = PackageSet::new(vec![
            package("a")
                .with_dependency(DependencyKind::Runtime, "b", "1.0.0")
                .with_dependency(DependencyKind::Runtime, "lodash", "^4.0.0")
                .with_dependency(DependencyKind::Dev, "ghost", "workspace:*"),
            package("b"),
        ]);

        let graph = DependencyGraph::build(&packages);
        assert_eq!(graph.dependencies_of("a").collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(graph.dependents_of("b").collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.contains("ghost"));
    }

    #[test]
    fn test_dependency_declared_in_several_tables_is_one_edge() {
        let packages = PackageSet::new(vec![
            package("a")
                .with_dependency(DependencyKind::Runtime, "b", "^1.0.0")
                .with_dependency(DependencyKind::Peer, "b", "^1.0.0"),
            package("b"),
        ]);

        let graph = DependencyGraph::build(&packages);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_cycles_are_kept() {
        let packages = PackageSet::new(vec![
            package("a").with_dependency(DependencyKind::Runtime, "b", "workspace:*"),
            package("b").with_dependency(DependencyKind::Dev, "a", "workspace:*"),
        ]);

        let graph = DependencyGraph::build(&packages);
        assert_eq!(graph.dependents_of("a").collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(graph.dependents_of("b").collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_unknown_package_has_no_edges() {
        let graph = DependencyGraph::build(&PackageSet::default());
        assert_eq!(graph.dependents_of("x").count(), 0);
        assert_eq!(graph.dependencies_of("x").count(), 0);
    }
}
