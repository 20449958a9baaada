use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, ErrorData, ErrorData as McpError, Implementation, ListResourcesResult, PaginatedRequestParams,
    ProtocolVersion, ReadResourceRequestParams, ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::{ServerHandler, service::RequestContext, tool, tool_handler, tool_router};
use std::sync::Arc;
use tracing::info;

use aicd_engine::{
    HandlerReport, ProjectPaths, ScriptRunner, ShellRunner, ToolContext, handle_analyze, handle_config, handle_deploy, handle_rollback,
    handle_status,
};
use aicd_types::{AnalyzeArgs, ConfigArgs, DeployArgs, RollbackArgs, StatusArgs};

use crate::server::resources;

/// The MCP server core: five CI/CD tools over the orchestration engine
/// plus the `cicd://` resource tree.
///
/// Holds no per-request state; a fresh [`ToolContext`] is built for every
/// tool invocation so configuration is always re-read from disk.
#[derive(Clone)]
pub struct AicdMcpCore {
    tool_router: ToolRouter<Self>,
    paths: ProjectPaths,
    runner: Arc<dyn ScriptRunner>,
}

#[tool_router]
impl AicdMcpCore {
    /// Core over the real shell runner.
    pub fn new(paths: ProjectPaths) -> Self {
        Self::with_runner(paths, Arc::new(ShellRunner))
    }

    /// Core over an explicit runner. Used by tests and previews.
    pub fn with_runner(paths: ProjectPaths, runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            paths,
            runner,
        }
    }

    fn tool_context(&self) -> ToolContext {
        ToolContext::new(self.paths.clone(), self.runner.clone())
    }

    fn respond(tool_name: &str, handled: HandlerReport) -> CallToolResult {
        info!(tool = tool_name, halted = ?handled.halted, "tool invocation finished");
        CallToolResult::success(vec![Content::text(handled.report.render())])
    }

    #[tool(
        name = "cicd_status",
        annotations(read_only_hint = true),
        description = "Report CI/CD system status: project configuration, pipeline script availability, deployment setup, and system health. Input: kind(project|pipeline|deploy|health|all), environment?, verbose?. Best-effort: a failing subtype renders inline and never aborts the rest."
    )]
    async fn cicd_status(&self, param: Parameters<StatusArgs>) -> Result<CallToolResult, ErrorData> {
        let handled = handle_status(&self.tool_context(), param.0).await;
        Ok(Self::respond("cicd_status", handled))
    }

    #[tool(
        name = "cicd_deploy",
        description = "Deploy the project to an environment with pre-checks and safety gating. Input: environment(development|staging|production), version?, dry_run?, force?. A live production deploy halts for confirmation unless force is set; dry_run runs the pre-checks only."
    )]
    async fn cicd_deploy(&self, param: Parameters<DeployArgs>) -> Result<CallToolResult, ErrorData> {
        let handled = handle_deploy(&self.tool_context(), param.0).await;
        Ok(Self::respond("cicd_deploy", handled))
    }

    #[tool(
        name = "cicd_rollback",
        description = "Roll back a deployment to an earlier version. Input: version?, environment?, list_versions?, dry_run?, force?. Halts when rollback is disabled in configuration; requires force for execution; list_versions and dry_run are read-only."
    )]
    async fn cicd_rollback(&self, param: Parameters<RollbackArgs>) -> Result<CallToolResult, ErrorData> {
        let handled = handle_rollback(&self.tool_context(), param.0).await;
        Ok(Self::respond("cicd_rollback", handled))
    }

    #[tool(
        name = "cicd_analyze",
        annotations(read_only_hint = true),
        description = "Analyze CI/CD logs, configuration, deployments, performance, or security. Tries the AI-assisted analysis first and degrades to a deterministic baseline when it is unavailable. Input: kind(logs|config|deploy|performance|security), target?, query?, time_range?, detailed?."
    )]
    async fn cicd_analyze(&self, param: Parameters<AnalyzeArgs>) -> Result<CallToolResult, ErrorData> {
        let handled = handle_analyze(&self.tool_context(), param.0).await;
        Ok(Self::respond("cicd_analyze", handled))
    }

    #[tool(
        name = "cicd_config",
        description = "Manage CI/CD configuration: show a node or file, compare two environments, validate, merge, or diff. Input: action(show|compare|validate|merge|diff), config?, env1?, env2?, format(yaml|json|table)?."
    )]
    async fn cicd_config(&self, param: Parameters<ConfigArgs>) -> Result<CallToolResult, ErrorData> {
        let handled = handle_config(&self.tool_context(), param.0).await;
        Ok(Self::respond("cicd_config", handled))
    }
}

#[tool_handler]
impl ServerHandler for AicdMcpCore {
    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        std::future::ready(Ok(resources::list_resources()))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        std::future::ready(resources::read_resource(&self.paths, &request.uri))
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().enable_resources().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "aicd".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Aicd CI/CD MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "CI/CD automation over the project toolchain.\nTOOLS:\n- cicd_status: read-only status report (project, pipeline, deploy, health, all).\n- cicd_deploy: gated deployment; use dry_run=true for a pre-check preview; live production deploys need force=true.\n- cicd_rollback: gated rollback; list_versions=true lists candidates; dry_run=true previews; execution needs force=true.\n- cicd_analyze: AI-assisted analysis with deterministic fallback (logs, config, deploy, performance, security).\n- cicd_config: show, compare, validate, merge, diff configuration.\nRESOURCES:\n- cicd://config/*, cicd://pipeline/*, cicd://templates/*, cicd://scripts/list.\nAll tool responses are markdown reports; failures are reported inline rather than as protocol errors."
                    .to_string(),
            ),
        }
    }
}
