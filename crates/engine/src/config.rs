//! Central configuration access.
//!
//! The central document is re-read from disk on every call, so external
//! edits are always visible; the cost of a fresh read is preferred over
//! staleness. Dotted-path lookup treats an absent segment as a valid
//! outcome, not an error — callers branch on `None`.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::paths::ProjectPaths;

/// Failure to read or parse a configuration document. Fatal to the
/// requesting step; rendered into the report with a remediation hint.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// A short hint rendered next to the error in reports.
    pub fn remediation(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "check that the config directory exists and the file is readable",
            ConfigError::Parse { .. } => "fix the YAML syntax and retry",
        }
    }
}

/// Reads and resolves configuration documents under a project layout.
#[derive(Debug, Clone)]
pub struct ConfigAccessor {
    paths: ProjectPaths,
}

impl ConfigAccessor {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    /// Re-read the canonical central configuration document.
    pub fn load_central(&self) -> Result<Value, ConfigError> {
        load_yaml(&self.paths.central_config())
    }

    /// Load a configuration file; relative paths resolve against the
    /// config directory.
    pub fn load_file(&self, path: &str) -> Result<Value, ConfigError> {
        let candidate = Path::new(path);
        let full = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.paths.config_dir().join(candidate)
        };
        load_yaml(&full)
    }

    /// Resolve the override mapping for one environment.
    ///
    /// A dedicated `config/environment/<name>.yaml` file takes precedence;
    /// otherwise the override is derived from the central document's
    /// `environments.<name>` entry. Missing both yields an empty mapping.
    pub fn environment_overrides(&self, environment: &str) -> Result<Value, ConfigError> {
        let dedicated = self.paths.environment_file(environment);
        if dedicated.is_file() {
            return load_yaml(&dedicated);
        }
        let central = self.load_central()?;
        Ok(lookup(&central, &format!("environments.{environment}"))
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }
}

fn load_yaml(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk a dotted path segment by segment. Returns `None` when a segment is
/// absent or the current value is not a mapping.
pub fn lookup<'a>(document: &'a Value, dotted_path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in dotted_path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Flatten a nested mapping into dot-joined key/value rows, preserving
/// document order.
pub fn flatten(document: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into(document, String::new(), &mut rows);
    rows
}

fn flatten_into(value: &Value, prefix: String, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let joined = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                flatten_into(nested, joined, rows);
            }
        }
        other => rows.push((prefix, display_value(other))),
    }
}

/// Render a scalar or compound value for table cells and comparisons.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}
