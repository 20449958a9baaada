//! Shared type definitions for the aicd automation bridge.
//!
//! This crate holds the data model exchanged between the protocol surface
//! and the orchestration engine: execution request/result records, typed
//! per-tool argument structs, and the halt-reason vocabulary used by the
//! tool handlers' decision trees.

pub mod args;
pub mod exec;
pub mod outcome;

pub use args::{
    AnalyzeArgs, AnalyzeKind, ConfigAction, ConfigArgs, DeployArgs, Environment, ReportFormat, RollbackArgs, StatusArgs, StatusKind,
    TimeRange,
};
pub use exec::{ExecOutcome, ExecRequest};
pub use outcome::HaltReason;
