//! Deploy handler: confirmation gate, pre-checks, dry-run exit, execution.

use tracing::{debug, warn};

use aicd_types::{DeployArgs, Environment, HaltReason};

use crate::catalog::Operation;
use crate::config::lookup;
use crate::handlers::{ToolContext, timestamp};
use crate::report::{HandlerReport, Report};

/// Run the deploy decision tree.
///
/// Strictly sequential: guard, pre-checks, dry-run exit, execution. A live
/// production deploy halts for confirmation before any external call is
/// made.
pub async fn handle_deploy(ctx: &ToolContext, args: DeployArgs) -> HandlerReport {
    let mut report = Report::titled("Deployment");
    report.quote(format!("Time: {}", timestamp()));
    report.quote(format!("Environment: {}", args.environment));
    if let Some(version) = &args.version {
        report.quote(format!("Version: {version}"));
    }
    report.quote(format!("Mode: {}", if args.dry_run { "pre-check only" } else { "live deployment" }));

    // Guard: a live production deploy needs explicit confirmation.
    if args.environment == Environment::Production && !args.dry_run {
        if !args.force {
            warn!("production deploy halted for confirmation");
            report.heading(2, "Production deployment warning");
            report.text("You are about to deploy to the production environment. This is a high-risk operation.");
            report.text("Confirm the following before continuing:");
            report.bullets([
                "All tests have passed",
                "The release was verified in the staging environment",
                "A rollback plan is ready",
            ]);
            report.text("To proceed, call the tool again with `force: true`.");
            return HandlerReport::halted(report, HaltReason::ProductionConfirmationRequired);
        }
        report.text("Force mode: skipping confirmation and deploying straight to production.");
    }

    report.heading(2, "Pre-deployment checks");
    let precheck = run_precheck(ctx, args.environment).await;
    report.bullets(precheck.lines);

    if !precheck.passed {
        report.heading(3, "Pre-checks failed");
        report.text("Deployment cancelled. Resolve the issues above and retry.");
        return HandlerReport::halted(report, HaltReason::PrecheckFailed);
    }
    report.heading(3, "Pre-checks passed");

    if args.dry_run {
        report.rule();
        report.text("Dry-run mode: no deployment was executed.");
        report.text("All checks passed; the deployment is safe to run.");
        return HandlerReport::halted(report, HaltReason::DryRunComplete);
    }

    report.heading(2, "Deploy");
    let mut deploy_args = vec!["--env".to_string(), args.environment.to_string()];
    if let Some(version) = &args.version {
        deploy_args.push("--version".to_string());
        deploy_args.push(version.clone());
    }

    let outcome = ctx.run(&Operation::Deploy, deploy_args).await;
    if outcome.success() {
        debug!(environment = %args.environment, "deploy succeeded");
        report.heading(3, "Deployment succeeded");
        report.code(None, outcome.stdout);
        report.heading(3, "Next steps");
        report.bullets([
            "Verify the deployment result",
            "Run the smoke tests",
            "Monitor the application logs",
        ]);
    } else {
        warn!(environment = %args.environment, exit_code = outcome.exit_code, "deploy failed");
        report.heading(3, "Deployment failed");
        report.code(None, outcome.failure_output());
        render_failure_guidance(ctx, &mut report);
    }

    HandlerReport::completed(report)
}

struct Precheck {
    passed: bool,
    lines: Vec<String>,
}

/// The three independent pre-checks. The first two block; the diagnostic
/// is advisory only.
async fn run_precheck(ctx: &ToolContext, environment: Environment) -> Precheck {
    let mut lines = Vec::new();
    let mut passed = true;

    let validation = ctx.run(&Operation::Validate, vec![]).await;
    if validation.success() {
        lines.push("configuration validation passed".to_string());
    } else {
        lines.push(format!("configuration validation failed: {}", validation.failure_output()));
        passed = false;
    }

    match ctx.config().load_central() {
        Ok(central) => {
            if lookup(&central, &format!("environments.{environment}")).is_some() {
                lines.push(format!("environment configuration present: {environment}"));
            } else {
                lines.push(format!("environment configuration missing: {environment}"));
                passed = false;
            }
        }
        Err(error) => {
            lines.push(format!("could not read environment configuration: {error} ({})", error.remediation()));
            passed = false;
        }
    }

    let doctor = ctx.run(&Operation::Doctor, vec![]).await;
    if doctor.success() {
        lines.push("toolchain diagnostic passed".to_string());
    } else {
        lines.push("toolchain diagnostic reported issues (may not block the deployment)".to_string());
    }

    if environment == Environment::Production {
        lines.push("production deployments require extra confirmation".to_string());
    }

    Precheck { passed, lines }
}

/// On failure, the external system may roll back on its own; say which.
fn render_failure_guidance(ctx: &ToolContext, report: &mut Report) {
    let auto_rollback = ctx
        .config()
        .load_central()
        .ok()
        .and_then(|central| lookup(&central, "rollback.auto_rollback_on_failure").and_then(|value| value.as_bool()))
        .unwrap_or(false);

    if auto_rollback {
        report.heading(3, "Automatic rollback");
        report.text("Automatic rollback is enabled; the deployment system is expected to roll back on its own.");
    } else {
        report.heading(3, "Suggested actions");
        report.bullets([
            "Roll back manually with the `cicd_rollback` tool",
            "Analyze the failure with the `cicd_analyze` tool",
        ]);
    }
}
