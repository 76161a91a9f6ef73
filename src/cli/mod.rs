//! Command orchestration between argument parsing and the library

pub mod orchestration;

pub use orchestration::{
    collect_pending, run_init, run_status, run_update_workflow, InitReport, StatusReport,
    UpdateArgs, WorkflowResult,
};
