//! # Aicd Engine
//!
//! The orchestration core behind the conversational CI/CD bridge. A tool
//! invocation enters through one of the handlers, which walks a decision
//! tree over two collaborators: the process runner (external scripts) and
//! the config accessor (the central YAML document). Each step's outcome
//! feeds the next decision; the report assembler collects ordered sections
//! along the way and renders them only at the protocol boundary.
//!
//! Nothing here persists between invocations: a [`ToolContext`] is built
//! per call, configuration is re-read from disk on every access, and every
//! external process carries an explicit deadline.
//!
//! ## Modules
//!
//! - **`paths`**: explicit project root / scripts / config directory layout
//! - **`runner`**: external process execution with timeout and output caps
//! - **`catalog`**: the fixed mapping from logical operation to executable
//! - **`config`**: central configuration access and dotted-path lookup
//! - **`report`**: append-only report sections rendered to markdown
//! - **`handlers`**: the five tool decision trees

pub mod catalog;
pub mod config;
pub mod handlers;
pub mod paths;
pub mod report;
pub mod runner;

pub use catalog::{AiTask, CommandCatalog, Operation};
pub use config::{ConfigAccessor, ConfigError, flatten, lookup};
pub use handlers::{ToolContext, handle_analyze, handle_config, handle_deploy, handle_rollback, handle_status};
pub use paths::ProjectPaths;
pub use report::{HandlerReport, Report, Section};
pub use runner::{MCP_MODE_ENV, ScriptRunner, ScriptedRunner, ShellRunner};
