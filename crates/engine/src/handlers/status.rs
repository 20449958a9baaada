//! Status handler: best-effort observation across project, pipeline,
//! deploy, and health subtypes.
//!
//! There is no safety gating here. A failure in one subtype renders as an
//! inline error line and never aborts the others — the report is always
//! returned, possibly partial.

use aicd_types::{Environment, StatusArgs, StatusKind};
use aicd_util::truncate_text;

use crate::catalog::{AiTask, ENTRY_POINT, LINT_SCRIPT, Operation};
use crate::config::{display_value, lookup};
use crate::handlers::{ToolContext, timestamp};
use crate::report::{HandlerReport, Report};

/// The scripts probed by the pipeline subtype, with their roles.
const PIPELINE_SCRIPTS: [(&str, &str); 4] = [
    (ENTRY_POINT, "command-line entry point"),
    ("ai-supervisor.sh", "AI supervision"),
    ("config-wizard.sh", "configuration wizard"),
    (LINT_SCRIPT, "shell static analysis"),
];

/// Run the requested status subtypes in fixed order.
pub async fn handle_status(ctx: &ToolContext, args: StatusArgs) -> HandlerReport {
    let mut report = Report::titled("CI/CD Status Report");
    report.quote(format!("Generated: {}", timestamp()));
    if let Some(environment) = args.environment {
        report.quote(format!("Environment: {environment}"));
    }

    match args.kind {
        StatusKind::Project => project_status(ctx, args.verbose, &mut report).await,
        StatusKind::Pipeline => pipeline_status(ctx, args.verbose, &mut report).await,
        StatusKind::Deploy => deploy_status(ctx, args.environment, args.verbose, &mut report).await,
        StatusKind::Health => health_status(ctx, args.verbose, &mut report).await,
        StatusKind::All => {
            project_status(ctx, args.verbose, &mut report).await;
            pipeline_status(ctx, args.verbose, &mut report).await;
            deploy_status(ctx, args.environment, args.verbose, &mut report).await;
            health_status(ctx, args.verbose, &mut report).await;
        }
    }

    HandlerReport::completed(report)
}

async fn project_status(ctx: &ToolContext, verbose: bool, report: &mut Report) {
    report.heading(2, "Project status");

    match ctx.config().load_central() {
        Ok(central) => {
            if let Some(project) = lookup(&central, "project") {
                let field = |name: &str| lookup(project, name).map(display_value).unwrap_or_else(|| "N/A".to_string());
                report.table(
                    &["property", "value"],
                    vec![
                        vec!["name".to_string(), field("name")],
                        vec!["version".to_string(), field("version")],
                        vec!["description".to_string(), field("description")],
                    ],
                );
            } else {
                report.text("No project configuration found.");
            }
        }
        Err(error) => {
            report.text(format!("Failed to read project status: {error} ({})", error.remediation()));
            return;
        }
    }

    if verbose {
        let validation = ctx.run(&Operation::Validate, vec![]).await;
        report.heading(3, "Configuration validation");
        if validation.success() {
            report.text("Configuration validation passed.");
        } else {
            report.text("Configuration validation failed.");
            report.code(None, validation.failure_output());
        }
    }
}

async fn pipeline_status(ctx: &ToolContext, verbose: bool, report: &mut Report) {
    report.heading(2, "Pipeline status");

    let mut rows = Vec::new();
    for (script, role) in PIPELINE_SCRIPTS {
        let probe = ctx.run(&Operation::ScriptHelp(script.to_string()), vec![]).await;
        let state = if probe.success() {
            "available"
        } else if probe.exit_code == 127 {
            "not available"
        } else {
            "degraded"
        };
        rows.push(vec![script.to_string(), role.to_string(), state.to_string()]);
    }
    report.table(&["script", "role", "state"], rows);

    if verbose {
        let doctor = ctx.run(&Operation::Doctor, vec![]).await;
        report.heading(3, "Diagnostic output");
        report.code(None, if doctor.stdout.is_empty() { doctor.stderr } else { doctor.stdout });
    }
}

async fn deploy_status(ctx: &ToolContext, environment: Option<Environment>, verbose: bool, report: &mut Report) {
    report.heading(2, "Deployment status");

    let central = match ctx.config().load_central() {
        Ok(central) => central,
        Err(error) => {
            report.text(format!("Failed to read deployment status: {error} ({})", error.remediation()));
            return;
        }
    };

    if let Some(environments) = lookup(&central, "environments").and_then(|value| value.as_object()) {
        let rows = environments
            .iter()
            .map(|(name, overrides)| {
                let log_level = lookup(overrides, "log_level").map(display_value).unwrap_or_else(|| "N/A".to_string());
                let mode = if lookup(overrides, "debug").and_then(|value| value.as_bool()).unwrap_or(false) {
                    "debug"
                } else {
                    "production"
                };
                let marker = match environment {
                    Some(selected) if selected.as_str() == name => "(current)",
                    _ => "",
                };
                vec![name.clone(), log_level, mode.to_string(), marker.to_string()]
            })
            .collect();
        report.table(&["environment", "log level", "mode", ""], rows);
    }

    if lookup(&central, "rollback").is_some() {
        report.heading(3, "Rollback configuration");
        let strategies = lookup(&central, "rollback.strategies")
            .and_then(|value| value.as_array())
            .map(|list| list.iter().map(display_value).collect::<Vec<_>>().join(", "))
            .unwrap_or_else(|| "N/A".to_string());
        let auto_rollback = lookup(&central, "rollback.auto_rollback_on_failure")
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        report.bullets([
            format!("strategies: {strategies}"),
            format!("auto rollback: {}", if auto_rollback { "enabled" } else { "disabled" }),
        ]);
    }

    if verbose {
        if let Some(commands) = lookup(&central, "deploy.commands").and_then(|value| value.as_array()) {
            report.heading(3, "Deploy commands");
            report.bullets(commands.iter().enumerate().map(|(index, command)| {
                format!("{}. `{}`", index + 1, display_value(command))
            }));
        }
    }
}

async fn health_status(ctx: &ToolContext, verbose: bool, report: &mut Report) {
    report.heading(2, "System health");

    let ai_health = ctx.run(&Operation::Ai(AiTask::HealthCheck), vec![]).await;
    if ai_health.success() && !ai_health.stdout.is_empty() {
        report.raw(ai_health.stdout);
        return;
    }

    report.heading(3, "Basic health check");
    let mut rows = Vec::new();

    let config_state = match ctx.config().load_central() {
        Ok(_) => "ok",
        Err(_) => "error",
    };
    rows.push(vec!["configuration file".to_string(), config_state.to_string()]);

    let doctor = ctx.run(&Operation::Doctor, vec![]).await;
    rows.push(vec![
        "CI/CD toolchain".to_string(),
        if doctor.success() { "ok" } else { "partially degraded" }.to_string(),
    ]);

    report.table(&["check", "state"], rows);

    if verbose && !ai_health.stderr.is_empty() {
        report.heading(3, "Details");
        report.code(None, truncate_text(&ai_health.stderr, 1000));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::scripted_context;

    const CENTRAL: &str = "\
project:
  name: demo
  version: 1.0.0
environments:
  staging:
    log_level: debug
    debug: true
  production:
    log_level: warn
rollback:
  strategies: [blue-green]
  auto_rollback_on_failure: true
deploy:
  commands: [\"make build\", \"make deploy\"]
";

    #[tokio::test]
    async fn project_status_renders_the_project_table() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        let args = StatusArgs {
            kind: StatusKind::Project,
            ..StatusArgs::default()
        };
        let result = handle_status(&ctx, args).await;

        assert!(result.halted.is_none());
        let rendered = result.report.render();
        assert!(rendered.contains("| name | demo |"));
        assert!(rendered.contains("| version | 1.0.0 |"));
        assert!(rendered.contains("| description | N/A |"));
        assert!(!rendered.contains("Failed to read"));
        assert!(runner.calls().is_empty(), "non-verbose project status reads config only");
    }

    #[tokio::test]
    async fn config_errors_degrade_to_an_inline_line_without_aborting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = std::sync::Arc::new(crate::runner::ScriptedRunner::new());
        runner.respond_err(ENTRY_POINT, 1, "unavailable");
        let ctx = ToolContext::new(crate::paths::ProjectPaths::new(dir.path()), runner.clone());

        let result = handle_status(&ctx, StatusArgs::default()).await;
        let rendered = result.report.render();
        // project and deploy subtypes fail on the missing config, the others still render
        assert!(rendered.contains("Failed to read project status"));
        assert!(rendered.contains("Failed to read deployment status"));
        assert!(rendered.contains("Pipeline status"));
        assert!(rendered.contains("System health"));
    }

    #[tokio::test]
    async fn all_runs_every_subtype_in_fixed_order() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        runner.respond_ok("aicd.sh --help", "usage");
        runner.respond_ok("ai-supervisor.sh --help", "usage");
        runner.respond_ok("config-wizard.sh --help", "usage");
        runner.respond_ok("lint.sh --help", "usage");
        runner.respond_ok("aicd.sh ai", "healthy");

        let result = handle_status(&ctx, StatusArgs::default()).await;
        let rendered = result.report.render();
        let project = rendered.find("## Project status").expect("project");
        let pipeline = rendered.find("## Pipeline status").expect("pipeline");
        let deploy = rendered.find("## Deployment status").expect("deploy");
        let health = rendered.find("## System health").expect("health");
        assert!(project < pipeline && pipeline < deploy && deploy < health);
    }

    #[tokio::test]
    async fn pipeline_status_marks_missing_scripts() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        runner.respond_ok("aicd.sh --help", "usage");
        runner.respond_ok("lint.sh --help", "usage");
        runner.respond_err("config-wizard.sh --help", 2, "bad flag");
        // ai-supervisor.sh gets no response: spawn failure, exit 127

        let args = StatusArgs {
            kind: StatusKind::Pipeline,
            ..StatusArgs::default()
        };
        let result = handle_status(&ctx, args).await;
        let rendered = result.report.render();
        assert!(rendered.contains("| aicd.sh | command-line entry point | available |"));
        assert!(rendered.contains("| ai-supervisor.sh | AI supervision | not available |"));
        assert!(rendered.contains("| config-wizard.sh | configuration wizard | degraded |"));
    }

    #[tokio::test]
    async fn deploy_status_marks_the_selected_environment() {
        let (_dir, _runner, ctx) = scripted_context(CENTRAL);
        let args = StatusArgs {
            kind: StatusKind::Deploy,
            environment: Some(Environment::Staging),
            verbose: true,
        };
        let result = handle_status(&ctx, args).await;
        let rendered = result.report.render();
        assert!(rendered.contains("| staging | debug | debug | (current) |"));
        assert!(rendered.contains("| production | warn | production |  |"));
        assert!(rendered.contains("auto rollback: enabled"));
        assert!(rendered.contains("`make deploy`"));
    }

    #[tokio::test]
    async fn health_prefers_the_ai_check_and_degrades_to_basics() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        runner.respond_ok("aicd.sh ai", "all systems nominal");

        let args = StatusArgs {
            kind: StatusKind::Health,
            ..StatusArgs::default()
        };
        let result = handle_status(&ctx, args.clone()).await;
        assert!(result.report.render().contains("all systems nominal"));

        let (_dir2, runner2, ctx2) = scripted_context(CENTRAL);
        runner2.respond_err("aicd.sh ai", 1, "model offline");
        runner2.respond_ok("aicd.sh doctor", "fine");
        let result = handle_status(&ctx2, args).await;
        let rendered = result.report.render();
        assert!(rendered.contains("Basic health check"));
        assert!(rendered.contains("| configuration file | ok |"));
        assert!(rendered.contains("| CI/CD toolchain | ok |"));
    }
}
