//! Commit analysis: bump types, commit ownership and target selection

pub mod attribution;
pub mod bump;
pub mod targets;

pub use attribution::{attribute, filter_commits, pending_commits};
pub use bump::BumpCalculator;
pub use targets::{resolve_targets, TargetSelection};
