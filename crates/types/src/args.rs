//! Typed, schema-validated argument structs for each tool.
//!
//! These are deserialized at the protocol boundary; enum fields reject
//! unknown variants there, so handler logic never sees an invalid
//! sub-action or environment name.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment environments recognized across every tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// All environments in their canonical listing order.
    pub const ALL: [Environment; 3] = [Environment::Development, Environment::Staging, Environment::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Status report subtypes.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Project,
    Pipeline,
    Deploy,
    Health,
    #[default]
    All,
}

/// Analysis families offered by the analyze tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzeKind {
    Logs,
    Config,
    Deploy,
    Performance,
    Security,
}

impl AnalyzeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzeKind::Logs => "logs",
            AnalyzeKind::Config => "config",
            AnalyzeKind::Deploy => "deploy",
            AnalyzeKind::Performance => "performance",
            AnalyzeKind::Security => "security",
        }
    }
}

/// Look-back window for log and deployment analysis.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeRange::Hour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        };
        f.write_str(label)
    }
}

/// Config tool sub-actions.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigAction {
    Show,
    Compare,
    Validate,
    Merge,
    Diff,
}

impl ConfigAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigAction::Show => "show",
            ConfigAction::Compare => "compare",
            ConfigAction::Validate => "validate",
            ConfigAction::Merge => "merge",
            ConfigAction::Diff => "diff",
        }
    }
}

/// Rendering format for config output.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Yaml,
    Json,
    Table,
}

/// Arguments for the status tool. No safety gating; purely observational.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusArgs {
    /// Status subtype to report; `all` runs every subtype in fixed order.
    #[schemars(description = "Status subtype: project, pipeline, deploy, health, or all.")]
    #[serde(default)]
    pub kind: StatusKind,
    /// Environment highlighted in environment tables.
    #[schemars(description = "Optional environment to highlight in the report.")]
    pub environment: Option<Environment>,
    /// Whether to include verbose diagnostic sections.
    #[schemars(description = "Include verbose diagnostic detail.")]
    #[serde(default)]
    pub verbose: bool,
}

/// Arguments for the deploy tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeployArgs {
    /// Target environment; production requires `force` unless dry-running.
    #[schemars(description = "Target deployment environment.")]
    pub environment: Environment,
    /// Version to deploy; latest when absent.
    #[schemars(description = "Version to deploy, for example v1.2.0. Defaults to the latest build.")]
    pub version: Option<String>,
    /// Run pre-checks only, without deploying.
    #[schemars(description = "Run pre-checks only; the deploy command is never invoked.")]
    #[serde(default)]
    pub dry_run: bool,
    /// Skip the confirmation gate (required for live production deploys).
    #[schemars(description = "Skip confirmation. Required for a live production deployment.")]
    #[serde(default)]
    pub force: bool,
}

/// Arguments for the rollback tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackArgs {
    /// Version to roll back to; the previous version when absent.
    #[schemars(description = "Version to roll back to. Defaults to the previous version.")]
    pub version: Option<String>,
    /// Environment the rollback targets.
    #[schemars(description = "Environment the rollback targets.")]
    pub environment: Option<Environment>,
    /// List candidate versions instead of rolling back.
    #[schemars(description = "Only list versions available for rollback; do not execute.")]
    #[serde(default)]
    pub list_versions: bool,
    /// Preview the rollback without executing it.
    #[schemars(description = "Preview the rollback scope without executing it.")]
    #[serde(default)]
    pub dry_run: bool,
    /// Skip the confirmation gate.
    #[schemars(description = "Skip confirmation and execute the rollback.")]
    #[serde(default)]
    pub force: bool,
}

/// Arguments for the analyze tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeArgs {
    /// Analysis family to run.
    #[schemars(description = "Analysis type: logs, config, deploy, performance, or security.")]
    pub kind: AnalyzeKind,
    /// Analysis target such as a log or config file path.
    #[schemars(description = "Optional analysis target (log file path, config file path).")]
    pub target: Option<String>,
    /// Free-text query passed to log search.
    #[schemars(description = "Optional query keyword or problem description.")]
    pub query: Option<String>,
    /// Look-back window.
    #[schemars(description = "Time range to analyze.")]
    #[serde(default)]
    pub time_range: TimeRange,
    /// Whether to append the fixed advisory bullet set for the type.
    #[schemars(description = "Append detailed advisory guidance for the analysis type.")]
    #[serde(default)]
    pub detailed: bool,
}

/// Arguments for the config tool.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Sub-action to perform.
    #[schemars(description = "Action: show, compare, validate, merge, or diff.")]
    pub action: ConfigAction,
    /// Dotted node path (for show), file path (for show/validate), or merge output path.
    #[schemars(description = "Config file path or dotted node path such as project.name.")]
    pub config: Option<String>,
    /// First environment or file operand.
    #[schemars(description = "First environment (compare/merge) or file (diff).")]
    pub env1: Option<String>,
    /// Second environment or file operand.
    #[schemars(description = "Second environment (compare) or file (diff).")]
    pub env2: Option<String>,
    /// Output rendering format for show.
    #[schemars(description = "Output format: yaml, json, or table.")]
    #[serde(default)]
    pub format: ReportFormat,
}
