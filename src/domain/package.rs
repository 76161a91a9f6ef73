use crate::boundary::BoundaryWarning;
use crate::domain::VersionSpecifier;
use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;

/// Which manifest table a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Runtime,
    Dev,
    Peer,
}

impl DependencyKind {
    /// Lookup order used when a package declares the same dependency twice
    pub const ALL: [DependencyKind; 3] =
        [DependencyKind::Runtime, DependencyKind::Dev, DependencyKind::Peer];

    /// The `package.json` key holding this table
    pub fn manifest_key(&self) -> &'static str {
        match self {
            DependencyKind::Runtime => "dependencies",
            DependencyKind::Dev => "devDependencies",
            DependencyKind::Peer => "peerDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

/// A workspace member as read from its manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    /// Raw version string; validated only when a bump is computed
    pub version: String,
    /// Absolute directory holding the manifest
    pub path: PathBuf,
    /// Directory relative to the workspace root, `/`-separated
    pub relative_path: String,
    pub dependencies: IndexMap<String, VersionSpecifier>,
    pub dev_dependencies: IndexMap<String, VersionSpecifier>,
    pub peer_dependencies: IndexMap<String, VersionSpecifier>,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
    ) -> Self {
        Package {
            name: name.into(),
            version: version.into(),
            path: path.into(),
            relative_path: relative_path.into(),
            dependencies: IndexMap::new(),
            dev_dependencies: IndexMap::new(),
            peer_dependencies: IndexMap::new(),
        }
    }

    /// Builder-style helper to declare a dependency
    pub fn with_dependency(mut self, kind: DependencyKind, name: &str, specifier: &str) -> Self {
        self.dependency_table_mut(kind)
            .insert(name.to_string(), VersionSpecifier::parse(specifier));
        self
    }

    pub fn dependency_table(&self, kind: DependencyKind) -> &IndexMap<String, VersionSpecifier> {
        match kind {
            DependencyKind::Runtime => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
        }
    }

    pub fn dependency_table_mut(
        &mut self,
        kind: DependencyKind,
    ) -> &mut IndexMap<String, VersionSpecifier> {
        match kind {
            DependencyKind::Runtime => &mut self.dependencies,
            DependencyKind::Dev => &mut self.dev_dependencies,
            DependencyKind::Peer => &mut self.peer_dependencies,
        }
    }

    /// Declared specifier for `dependency`: runtime, then dev, then peer
    pub fn declared_specifier(&self, dependency: &str) -> Option<&VersionSpecifier> {
        DependencyKind::ALL
            .iter()
            .find_map(|kind| self.dependency_table(*kind).get(dependency))
    }

    /// Every declared dependency name across the three tables, deduplicated
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        let mut seen = indexmap::IndexSet::new();
        for kind in DependencyKind::ALL {
            for name in self.dependency_table(kind).keys() {
                seen.insert(name.as_str());
            }
        }
        seen.into_iter()
    }
}

/// Caller-owned snapshot of every package discovered in one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    packages: IndexMap<String, Package>,
}

impl PackageSet {
    /// Build a snapshot; on duplicate names the first package wins
    pub fn new(packages: Vec<Package>) -> Self {
        let mut set = PackageSet::default();
        for package in packages {
            if set.packages.contains_key(&package.name) {
                BoundaryWarning::DuplicatePackage {
                    name: package.name.clone(),
                    path: package.relative_path.clone(),
                }
                .emit();
                continue;
            }
            set.packages.insert(package.name.clone(), package);
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Package> {
        self.packages.values_mut()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
