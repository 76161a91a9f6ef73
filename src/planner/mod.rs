//! Update planning: propagation to dependents, conflict detection and
//! applying version changes to the manifests.

pub mod applier;
pub mod conflict;
pub mod propagation;

pub use applier::{AppliedPlan, VersionApplier};
pub use conflict::{check, Conflict};
pub use propagation::{expand, UpdatePlanner};
