//! Analyze handler: AI-assisted analysis with deterministic fallbacks.
//!
//! Every analysis family tries the richer AI-assisted command first and
//! degrades to a narrower deterministic command when it fails or returns
//! nothing. The `detailed` flag appends a fixed advisory set per family —
//! static guidance, not derived from the external output.

use tracing::debug;

use aicd_types::{AnalyzeArgs, AnalyzeKind};
use aicd_util::truncate_text;

use crate::catalog::{AiTask, Operation};
use crate::handlers::{ToolContext, timestamp};
use crate::report::{HandlerReport, Report};

/// Days of history handed to the deterministic log query fallback.
const LOG_FALLBACK_DAYS: &str = "7";

/// Run the requested analysis family.
pub async fn handle_analyze(ctx: &ToolContext, args: AnalyzeArgs) -> HandlerReport {
    let mut report = Report::titled("Analysis Report");
    report.quote(format!("Time: {}", timestamp()));
    report.quote(format!("Type: {}", args.kind.as_str()));
    if let Some(target) = &args.target {
        report.quote(format!("Target: {target}"));
    }
    if let Some(query) = &args.query {
        report.quote(format!("Query: {query}"));
    }
    report.quote(format!("Time range: {}", args.time_range));

    match args.kind {
        AnalyzeKind::Logs => analyze_logs(ctx, &args, &mut report).await,
        AnalyzeKind::Config => analyze_config(ctx, &args, &mut report).await,
        AnalyzeKind::Deploy => analyze_deployment(ctx, &mut report).await,
        AnalyzeKind::Performance => analyze_performance(ctx, &mut report).await,
        AnalyzeKind::Security => analyze_security(ctx, &args, &mut report).await,
    }

    if args.detailed {
        render_advisories(args.kind, &mut report);
    }

    HandlerReport::completed(report)
}

/// Whether a primary outcome is good enough to skip the fallback.
fn primary_succeeded(outcome: &aicd_types::ExecOutcome) -> bool {
    outcome.success() && !outcome.stdout.is_empty()
}

async fn analyze_logs(ctx: &ToolContext, args: &AnalyzeArgs, report: &mut Report) {
    report.heading(2, "Log analysis");

    let extra = args.target.clone().into_iter().collect();
    let primary = ctx.run(&Operation::Ai(AiTask::AnalyzeLogs), extra).await;
    if primary_succeeded(&primary) {
        report.raw(primary.stdout);
        return;
    }

    debug!("AI log analysis unavailable, falling back to log query");
    report.heading(3, "Baseline analysis");
    let mut query_args: Vec<String> = args.query.clone().into_iter().collect();
    query_args.push(LOG_FALLBACK_DAYS.to_string());
    let fallback = ctx.run(&Operation::QueryLogs, query_args).await;

    if fallback.stdout.is_empty() {
        report.text("No matching log entries found.");
    } else {
        report.heading(4, "Matching log entries");
        report.code(None, truncate_text(&fallback.stdout, 2000));
    }
}

async fn analyze_config(ctx: &ToolContext, args: &AnalyzeArgs, report: &mut Report) {
    report.heading(2, "Configuration analysis");

    let extra = args.target.clone().into_iter().collect();
    let primary = ctx.run(&Operation::Ai(AiTask::AuditConfig), extra).await;
    if primary_succeeded(&primary) {
        report.raw(primary.stdout);
        return;
    }

    debug!("AI config audit unavailable, falling back to validation");
    report.heading(3, "Configuration validation");
    let fallback = ctx.run(&Operation::Validate, vec![]).await;
    if fallback.success() {
        report.text("Configuration validation passed.");
    } else {
        report.text("Configuration validation failed.");
        report.code(None, fallback.failure_output());
    }
}

async fn analyze_deployment(ctx: &ToolContext, report: &mut Report) {
    report.heading(2, "Deployment analysis");

    let detection = ctx.run(&Operation::Ai(AiTask::DetectErrors), vec![]).await;
    if primary_succeeded(&detection) {
        report.heading(3, "Error detection");
        report.raw(detection.stdout);
    }

    let doctor = ctx.run(&Operation::Doctor, vec![]).await;
    report.heading(3, "System diagnostic");
    report.code(None, truncate_text(&doctor.stdout, 1500));
}

async fn analyze_performance(ctx: &ToolContext, report: &mut Report) {
    report.heading(2, "Performance analysis");

    let benchmark = ctx.run(&Operation::Benchmark, vec![]).await;
    if primary_succeeded(&benchmark) {
        report.heading(3, "Benchmark results");
        report.code(None, truncate_text(&benchmark.stdout, 2000));
    }

    let monitor = ctx.run(&Operation::Monitor, vec![]).await;
    if primary_succeeded(&monitor) {
        report.heading(3, "Resource usage");
        report.code(None, truncate_text(&monitor.stdout, 1000));
    }
}

async fn analyze_security(ctx: &ToolContext, args: &AnalyzeArgs, report: &mut Report) {
    report.heading(2, "Security analysis");

    let extra = args.target.clone().into_iter().collect();
    let primary = ctx.run(&Operation::Ai(AiTask::CheckSecurity), extra).await;
    if primary_succeeded(&primary) {
        report.raw(primary.stdout);
        return;
    }

    debug!("AI security check unavailable, falling back to lint");
    report.heading(3, "Baseline security checks");
    let lint = ctx.run(&Operation::Lint, vec![]).await;
    report.heading(4, "Shell quality");
    if lint.success() {
        report.text("ShellCheck passed.");
    } else {
        report.text("ShellCheck found issues.");
        report.code(None, truncate_text(&lint.stdout, 1000));
    }
}

/// Fixed advisory bullets per analysis family.
fn render_advisories(kind: AnalyzeKind, report: &mut Report) {
    match kind {
        AnalyzeKind::Logs => {
            report.heading(3, "Log recommendations");
            report.bullets([
                "Check the context around error entries",
                "Watch for recurring error patterns",
                "Look for timing regularities in the failures",
            ]);
        }
        AnalyzeKind::Config => {
            report.heading(3, "Configuration recommendations");
            report.bullets([
                "Audit sensitive configuration regularly",
                "Manage secrets through environment variables",
                "Keep configuration under version control",
            ]);
        }
        AnalyzeKind::Deploy => {
            report.heading(3, "Deployment recommendations");
            report.bullets([
                "Adopt a blue-green deployment strategy",
                "Define automatic rollback thresholds",
                "Add post-deployment health checks",
                "Reduce risk with canary releases",
            ]);
        }
        AnalyzeKind::Performance => {
            report.heading(3, "Performance recommendations");
            report.bullets([
                "Tune the build cache strategy",
                "Parallelize test execution",
                "Use incremental builds",
                "Trim container image sizes",
            ]);
        }
        AnalyzeKind::Security => {
            report.heading(3, "Security recommendations");
            report.bullets([
                "Update dependencies regularly",
                "Scan for leaked credentials",
                "Use a managed secret store",
                "Enable artifact signing",
                "Apply the principle of least privilege",
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::scripted_context;
    use aicd_types::TimeRange;

    fn analyze_args(kind: AnalyzeKind) -> AnalyzeArgs {
        AnalyzeArgs {
            kind,
            target: None,
            query: None,
            time_range: TimeRange::default(),
            detailed: false,
        }
    }

    #[tokio::test]
    async fn successful_primary_skips_the_fallback() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_ok("aicd.sh ai", "three timeout spikes in api-gateway");

        let result = handle_analyze(&ctx, analyze_args(AnalyzeKind::Logs)).await;

        assert!(result.halted.is_none());
        assert_eq!(runner.call_keys(), vec!["aicd.sh ai"]);
        assert!(result.report.render().contains("timeout spikes"));
    }

    #[tokio::test]
    async fn failing_primary_always_invokes_the_log_query_fallback() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_err("aicd.sh ai", 1, "model offline");
        runner.respond_ok("log-manager.sh query", "ERROR connection refused");

        let args = AnalyzeArgs {
            query: Some("refused".to_string()),
            ..analyze_args(AnalyzeKind::Logs)
        };
        let result = handle_analyze(&ctx, args).await;

        assert_eq!(runner.call_keys(), vec!["aicd.sh ai", "log-manager.sh query"]);
        let query_call = runner.calls().into_iter().nth(1).expect("fallback call");
        assert_eq!(query_call.args, vec!["query", "refused", "7"]);
        assert!(result.report.render().contains("connection refused"));
    }

    #[tokio::test]
    async fn empty_primary_output_counts_as_failure() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_ok("aicd.sh ai", "");
        runner.respond_ok("log-manager.sh query", "");

        let result = handle_analyze(&ctx, analyze_args(AnalyzeKind::Logs)).await;

        assert_eq!(runner.call_keys(), vec!["aicd.sh ai", "log-manager.sh query"]);
        assert!(result.report.render().contains("No matching log entries found."));
    }

    #[tokio::test]
    async fn config_analysis_degrades_to_validation() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_err("aicd.sh ai", 1, "offline");
        runner.respond_err("aicd.sh validate", 2, "missing key: project.name");

        let result = handle_analyze(&ctx, analyze_args(AnalyzeKind::Config)).await;

        assert_eq!(runner.call_keys(), vec!["aicd.sh ai", "aicd.sh validate"]);
        let rendered = result.report.render();
        assert!(rendered.contains("Configuration validation failed."));
        assert!(rendered.contains("missing key: project.name"));
    }

    #[tokio::test]
    async fn security_analysis_falls_back_to_lint() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_err("aicd.sh ai", 1, "offline");
        runner.respond_ok("lint.sh", "");

        let result = handle_analyze(&ctx, analyze_args(AnalyzeKind::Security)).await;
        assert_eq!(runner.call_keys(), vec!["aicd.sh ai", "lint.sh"]);
        assert!(result.report.render().contains("ShellCheck passed."));
    }

    #[tokio::test]
    async fn deployment_analysis_runs_detection_and_diagnostic() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_ok("aicd.sh ai", "two failed deploys in the last day");
        runner.respond_ok("aicd.sh doctor", "toolchain ok");

        let result = handle_analyze(&ctx, analyze_args(AnalyzeKind::Deploy)).await;
        assert_eq!(runner.call_keys(), vec!["aicd.sh ai", "aicd.sh doctor"]);
        let rendered = result.report.render();
        assert!(rendered.contains("Error detection"));
        assert!(rendered.contains("toolchain ok"));
    }

    #[tokio::test]
    async fn performance_analysis_collects_benchmark_and_monitor() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_ok("aicd.sh benchmark", "build: 42s");
        runner.respond_ok("aicd.sh monitor", "cpu: 12%");

        let result = handle_analyze(&ctx, analyze_args(AnalyzeKind::Performance)).await;
        assert_eq!(runner.call_keys(), vec!["aicd.sh benchmark", "aicd.sh monitor"]);
        let rendered = result.report.render();
        assert!(rendered.contains("build: 42s"));
        assert!(rendered.contains("cpu: 12%"));
    }

    #[tokio::test]
    async fn detailed_flag_appends_the_fixed_advisory_set() {
        let (_dir, runner, ctx) = scripted_context("project: {}\n");
        runner.respond_ok("aicd.sh ai", "clean");

        let args = AnalyzeArgs {
            detailed: true,
            ..analyze_args(AnalyzeKind::Security)
        };
        let result = handle_analyze(&ctx, args).await;
        let rendered = result.report.render();
        assert!(rendered.contains("Security recommendations"));
        assert!(rendered.contains("least privilege"));
    }
}
