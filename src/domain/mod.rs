//! Domain logic - pure data and rules independent of git and the filesystem

pub mod commit;
pub mod package;
pub mod specifier;
pub mod strategy;
pub mod timestamp;
pub mod version;

pub use commit::{Commit, ParsedCommit};
pub use package::{DependencyKind, Package, PackageSet};
pub use specifier::{NpmRange, VersionSpecifier, Wildcard};
pub use strategy::{DependencyUpdate, UpdatePlan, UpdateReason, UpdateStrategy, VersionChange};
pub use version::{bump_version, parse_version, BumpType};
