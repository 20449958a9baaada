//! Halt-reason vocabulary for the tool handlers' decision trees.

use serde::{Deserialize, Serialize};

/// Machine-readable reason a handler stopped before its mutating step.
///
/// A halt is a planned branch of the decision tree, not a failure: the
/// handler still returns a complete report. Carrying the reason as an enum
/// keeps the gating logic testable independently of the rendered prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// A live production deploy was requested without `force`.
    ProductionConfirmationRequired,
    /// One of the blocking pre-checks failed.
    PrecheckFailed,
    /// A dry run completed; the mutating command was withheld.
    DryRunComplete,
    /// Rollback is disabled in the central configuration.
    RollbackDisabled,
    /// The operation needs an explicit `force` confirmation.
    ConfirmationRequired,
    /// Only the candidate version listing was requested.
    VersionListing,
}
