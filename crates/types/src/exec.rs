//! External process execution records.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A single external-process invocation, built once per decision step.
///
/// Instances are constructed by the command catalog and consumed exactly once
/// by a runner; nothing mutates a request after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    /// Absolute path of the executable to spawn.
    pub command: PathBuf,
    /// Ordered argument list passed verbatim.
    pub args: Vec<String>,
    /// Working directory for the child process.
    pub cwd: PathBuf,
    /// Hard deadline; the child is killed when it elapses.
    pub timeout: Duration,
    /// Additive environment overlay applied on top of the ambient environment.
    pub env: Vec<(String, String)>,
}

impl ExecRequest {
    /// Create a request with an empty environment overlay.
    pub fn new(command: impl Into<PathBuf>, args: Vec<String>, cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            cwd: cwd.into(),
            timeout,
            env: Vec::new(),
        }
    }
}

/// Outcome of one external-process invocation.
///
/// Every failure mode normalizes into this record: spawn errors and missing
/// executables surface as a non-zero `exit_code` with a diagnostic `stderr`,
/// and a missed deadline sets `timed_out` with `exit_code` -1. Runners never
/// return an `Err` past this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutcome {
    /// Captured standard output, trimmed, truncated at the runner's cap.
    pub stdout: String,
    /// Captured standard error, trimmed, truncated at the runner's cap.
    pub stderr: String,
    /// Process exit code; -1 when the process was killed on timeout.
    pub exit_code: i32,
    /// Whether the deadline elapsed before the process completed.
    pub timed_out: bool,
}

impl ExecOutcome {
    /// Success means a clean zero exit within the deadline.
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Outcome for a process that could not be spawned at all.
    pub fn spawn_failure(diagnostic: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: diagnostic.into(),
            exit_code: 127,
            timed_out: false,
        }
    }

    /// Outcome for a process killed at its deadline.
    pub fn timeout(stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: -1,
            timed_out: true,
        }
    }

    /// The stream most likely to explain a failure: stderr when present,
    /// stdout otherwise.
    pub fn failure_output(&self) -> &str {
        if self.stderr.is_empty() { &self.stdout } else { &self.stderr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_zero_exit_and_no_timeout() {
        let ok = ExecOutcome {
            stdout: "done".into(),
            stderr: String::new(),
            exit_code: 0,
            timed_out: false,
        };
        assert!(ok.success());

        let nonzero = ExecOutcome { exit_code: 2, ..ok.clone() };
        assert!(!nonzero.success());

        let timed = ExecOutcome::timeout("partial".into(), String::new());
        assert!(!timed.success());
        assert_eq!(timed.exit_code, -1);
    }

    #[test]
    fn failure_output_prefers_stderr() {
        let outcome = ExecOutcome {
            stdout: "out".into(),
            stderr: "err".into(),
            exit_code: 1,
            timed_out: false,
        };
        assert_eq!(outcome.failure_output(), "err");

        let quiet = ExecOutcome {
            stderr: String::new(),
            ..outcome
        };
        assert_eq!(quiet.failure_output(), "out");
    }
}
