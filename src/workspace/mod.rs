//! Workspace members: discovery, manifests and the in-repo dependency graph

pub mod graph;
pub mod manifest;
pub mod scanner;

pub use graph::DependencyGraph;
pub use manifest::{read_package, JsonManifestStore, ManifestStore, MANIFEST_FILE};
pub use scanner::{discover_workspace, find_workspace_root, scan_members, Workspace};
