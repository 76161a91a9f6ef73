pub mod analyzer;
pub mod boundary;
pub mod cache;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod planner;
pub mod ui;
pub mod workspace;

pub use error::{ChangelogError, Result};
