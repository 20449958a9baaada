//! The command catalog: the fixed contract between logical operations and
//! the external toolchain.
//!
//! Entry-point operations route through the canonical `aicd.sh` with a verb
//! as the first argument; narrower operations invoke their dedicated script
//! by filename. The catalog is the only constructor of [`ExecRequest`]s
//! used by the tool handlers, so argument shape and timeout policy live in
//! one place.

use std::path::PathBuf;
use std::time::Duration;

use aicd_types::ExecRequest;

use crate::paths::ProjectPaths;

/// The canonical toolchain entry point.
pub const ENTRY_POINT: &str = "aicd.sh";

pub const LOG_MANAGER_SCRIPT: &str = "log-manager.sh";
pub const LINT_SCRIPT: &str = "lint.sh";
pub const CONFIG_MERGER_SCRIPT: &str = "config-merger.sh";
pub const VALIDATE_CONFIG_SCRIPT: &str = "validate-config.sh";
pub const VERSION_MANAGER_SCRIPT: &str = "config-version-manager.sh";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEPLOY_TIMEOUT: Duration = Duration::from_secs(300);
const ROLLBACK_TIMEOUT: Duration = Duration::from_secs(180);
const BENCHMARK_TIMEOUT: Duration = Duration::from_secs(120);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// AI-assisted subcommands of the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTask {
    AnalyzeLogs,
    AuditConfig,
    DetectErrors,
    CheckSecurity,
    HealthCheck,
}

impl AiTask {
    fn verb(&self) -> &'static str {
        match self {
            AiTask::AnalyzeLogs => "analyze-logs",
            AiTask::AuditConfig => "audit-config",
            AiTask::DetectErrors => "detect-errors",
            AiTask::CheckSecurity => "check-security",
            AiTask::HealthCheck => "health-check",
        }
    }
}

/// Every logical operation the handlers can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `aicd.sh validate` — configuration validity check.
    Validate,
    /// `aicd.sh doctor` — general toolchain diagnostic.
    Doctor,
    /// `aicd.sh deploy` — execute a deployment.
    Deploy,
    /// `aicd.sh rollback` — execute a rollback.
    Rollback,
    /// `aicd.sh benchmark` — performance baseline run.
    Benchmark,
    /// `aicd.sh monitor` — resource usage snapshot.
    Monitor,
    /// `aicd.sh ai <task>` — AI-assisted analysis.
    Ai(AiTask),
    /// `log-manager.sh query` — deterministic log search.
    QueryLogs,
    /// `lint.sh` — shell static analysis.
    Lint,
    /// `config-merger.sh` — merge environment overrides.
    MergeConfig,
    /// `config-merger.sh --diff` — diff two config files.
    DiffConfig,
    /// `validate-config.sh` — validate a single config file.
    ValidateConfigFile,
    /// `config-version-manager.sh list` — list rollback candidates.
    ListVersions,
    /// `<script> --help` — availability probe for a named script.
    ScriptHelp(String),
}

impl Operation {
    fn script(&self) -> &str {
        match self {
            Operation::Validate
            | Operation::Doctor
            | Operation::Deploy
            | Operation::Rollback
            | Operation::Benchmark
            | Operation::Monitor
            | Operation::Ai(_) => ENTRY_POINT,
            Operation::QueryLogs => LOG_MANAGER_SCRIPT,
            Operation::Lint => LINT_SCRIPT,
            Operation::MergeConfig | Operation::DiffConfig => CONFIG_MERGER_SCRIPT,
            Operation::ValidateConfigFile => VALIDATE_CONFIG_SCRIPT,
            Operation::ListVersions => VERSION_MANAGER_SCRIPT,
            Operation::ScriptHelp(name) => name,
        }
    }

    fn base_args(&self) -> Vec<String> {
        match self {
            Operation::Validate => vec!["validate".into()],
            Operation::Doctor => vec!["doctor".into()],
            Operation::Deploy => vec!["deploy".into()],
            Operation::Rollback => vec!["rollback".into()],
            Operation::Benchmark => vec!["benchmark".into()],
            Operation::Monitor => vec!["monitor".into()],
            Operation::Ai(task) => vec!["ai".into(), task.verb().into()],
            Operation::QueryLogs => vec!["query".into()],
            Operation::ListVersions => vec!["list".into()],
            Operation::DiffConfig => vec!["--diff".into()],
            Operation::ScriptHelp(_) => vec!["--help".into()],
            Operation::Lint | Operation::MergeConfig | Operation::ValidateConfigFile => vec![],
        }
    }

    fn timeout(&self) -> Duration {
        match self {
            Operation::Deploy => DEPLOY_TIMEOUT,
            Operation::Rollback => ROLLBACK_TIMEOUT,
            Operation::Benchmark => BENCHMARK_TIMEOUT,
            Operation::ScriptHelp(_) => PROBE_TIMEOUT,
            _ => DEFAULT_TIMEOUT,
        }
    }
}

/// Builds execution requests for logical operations against a project layout.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    paths: ProjectPaths,
}

impl CommandCatalog {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    /// Build the request for an operation, appending `extra` after the
    /// operation's fixed argument prefix.
    pub fn request(&self, operation: &Operation, extra: Vec<String>) -> ExecRequest {
        let script: PathBuf = self.paths.script(operation.script());
        let mut args = operation.base_args();
        args.extend(extra);
        ExecRequest::new(script, args, self.paths.root(), operation.timeout())
    }
}
