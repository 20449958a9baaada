//! Tool handlers: one decision tree per logical operation family.
//!
//! Handlers are free functions over a per-invocation [`ToolContext`]. They
//! never throw past their boundary — external failures, config errors, and
//! planned halts all land in the returned [`HandlerReport`].

pub mod analyze;
pub mod config;
pub mod deploy;
pub mod rollback;
pub mod status;

pub use analyze::handle_analyze;
pub use config::handle_config;
pub use deploy::handle_deploy;
pub use rollback::handle_rollback;
pub use status::handle_status;

use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use aicd_types::ExecOutcome;
use aicd_util::redact_sensitive;

use crate::catalog::{CommandCatalog, Operation};
use crate::config::ConfigAccessor;
use crate::paths::ProjectPaths;
use crate::runner::ScriptRunner;

/// Per-invocation dependencies handed to every handler.
///
/// Built fresh for each tool call; holds no cross-invocation state.
pub struct ToolContext {
    runner: Arc<dyn ScriptRunner>,
    config: ConfigAccessor,
    catalog: CommandCatalog,
    paths: ProjectPaths,
}

impl ToolContext {
    pub fn new(paths: ProjectPaths, runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            runner,
            config: ConfigAccessor::new(paths.clone()),
            catalog: CommandCatalog::new(paths.clone()),
            paths,
        }
    }

    pub fn config(&self) -> &ConfigAccessor {
        &self.config
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Run one cataloged operation. Captured output is redacted before any
    /// handler can embed it in a report.
    pub(crate) async fn run(&self, operation: &Operation, extra: Vec<String>) -> ExecOutcome {
        let request = self.catalog.request(operation, extra);
        let outcome = self.runner.run(&request).await;
        ExecOutcome {
            stdout: redact_sensitive(&outcome.stdout),
            stderr: redact_sensitive(&outcome.stderr),
            exit_code: outcome.exit_code,
            timed_out: outcome.timed_out,
        }
    }
}

/// Report header timestamp.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
