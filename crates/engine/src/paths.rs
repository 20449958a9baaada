//! Project directory layout.
//!
//! The toolchain lives under a single project root: `scripts/` holds the
//! executable entry points and `config/` the YAML documents. The root is
//! resolved once at startup and passed into each handler context
//! explicitly; nothing reads it from process-global state afterwards.

use std::path::{Path, PathBuf};

/// Environment variable naming the project root for the toolchain.
pub const PROJECT_ROOT_ENV: &str = "AICD_PROJECT_ROOT";

const CENTRAL_CONFIG_FILE: &str = "central-config.yaml";
const AI_CONFIG_FILE: &str = "ai-config.yaml";

/// Resolved filesystem layout of the orchestrated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    /// Layout anchored at an explicit root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout from `AICD_PROJECT_ROOT`, falling back to the current
    /// working directory.
    pub fn from_env() -> Self {
        let root = std::env::var_os(PROJECT_ROOT_ENV)
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Path of a named script under `scripts/`.
    pub fn script(&self, name: &str) -> PathBuf {
        self.scripts_dir().join(name)
    }

    /// The canonical central configuration document.
    pub fn central_config(&self) -> PathBuf {
        self.config_dir().join(CENTRAL_CONFIG_FILE)
    }

    /// The AI supervision configuration document.
    pub fn ai_config(&self) -> PathBuf {
        self.config_dir().join(AI_CONFIG_FILE)
    }

    /// The dedicated override file for an environment, which takes
    /// precedence over the central document's `environments` section when
    /// present.
    pub fn environment_file(&self, environment: &str) -> PathBuf {
        self.config_dir().join("environment").join(format!("{environment}.yaml"))
    }

    /// A template family directory under `templates/`.
    pub fn templates_dir(&self, kind: &str) -> PathBuf {
        self.root.join("templates").join(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_anchored_at_the_root() {
        let paths = ProjectPaths::new("/srv/project");
        assert_eq!(paths.script("aicd.sh"), PathBuf::from("/srv/project/scripts/aicd.sh"));
        assert_eq!(paths.central_config(), PathBuf::from("/srv/project/config/central-config.yaml"));
        assert_eq!(
            paths.environment_file("staging"),
            PathBuf::from("/srv/project/config/environment/staging.yaml")
        );
        assert_eq!(paths.templates_dir("docker"), PathBuf::from("/srv/project/templates/docker"));
    }

    #[test]
    fn from_env_honors_the_root_variable() {
        temp_env::with_var(PROJECT_ROOT_ENV, Some("/opt/pipeline"), || {
            assert_eq!(ProjectPaths::from_env().root(), Path::new("/opt/pipeline"));
        });
    }
}
