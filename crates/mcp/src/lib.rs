//! Model Context Protocol (MCP) surface for the aicd automation bridge.
//!
//! This crate exposes the orchestration engine as an MCP server: five tools
//! (`cicd_status`, `cicd_deploy`, `cicd_rollback`, `cicd_analyze`,
//! `cicd_config`) plus a read-only `cicd://` resource tree over the
//! project's configuration, pipeline sections, templates, and scripts.

pub mod server;

pub use server::AicdMcpCore;
