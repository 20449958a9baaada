//! Rollback handler: configuration gate, version listing, preview, and
//! confirmation-gated execution.

use tracing::warn;

use aicd_types::{HaltReason, RollbackArgs};
use aicd_util::version::Version;

use crate::catalog::Operation;
use crate::config::{display_value, lookup};
use crate::handlers::{ToolContext, timestamp};
use crate::report::{HandlerReport, Report};

/// Run the rollback decision tree.
pub async fn handle_rollback(ctx: &ToolContext, args: RollbackArgs) -> HandlerReport {
    let mut report = Report::titled("Rollback");
    report.quote(format!("Time: {}", timestamp()));
    if let Some(environment) = args.environment {
        report.quote(format!("Environment: {environment}"));
    }
    if let Some(version) = &args.version {
        report.quote(format!("Target version: {version}"));
        if version.parse::<Version>().is_err() {
            report.quote(format!("Note: '{version}' does not follow the vMAJOR.MINOR.PATCH convention"));
        }
    }

    let central = match ctx.config().load_central() {
        Ok(central) => central,
        Err(error) => {
            report.heading(2, "Configuration error");
            report.text(format!("{error} ({})", error.remediation()));
            return HandlerReport::completed(report);
        }
    };

    let enabled = lookup(&central, "deploy.rollback_enabled").and_then(|value| value.as_bool()).unwrap_or(false);
    if !enabled {
        report.heading(2, "Rollback is disabled");
        report.text("Enable it by setting `deploy.rollback_enabled: true` in the central configuration.");
        return HandlerReport::halted(report, HaltReason::RollbackDisabled);
    }

    report.heading(2, "Rollback configuration");
    let strategies = lookup(&central, "rollback.strategies")
        .and_then(|value| value.as_array())
        .map(|list| list.iter().map(display_value).collect::<Vec<_>>().join(", "))
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| "default".to_string());
    let auto_rollback = lookup(&central, "rollback.auto_rollback_on_failure")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    report.table(
        &["setting", "value"],
        vec![
            vec!["strategies".to_string(), strategies],
            vec![
                "auto rollback".to_string(),
                if auto_rollback { "enabled" } else { "disabled" }.to_string(),
            ],
        ],
    );

    if args.list_versions {
        report.heading(2, "Versions available for rollback");
        render_available_versions(ctx, &mut report).await;
        return HandlerReport::halted(report, HaltReason::VersionListing);
    }

    if args.dry_run {
        report.heading(2, "Rollback preview");
        render_preview(args.version.as_deref(), &mut report);
        report.rule();
        report.text("Preview mode: no rollback was executed.");
        return HandlerReport::halted(report, HaltReason::DryRunComplete);
    }

    if !args.force {
        report.heading(2, "Rollback confirmation");
        report.text("A rollback affects the currently running service.");
        report.text("Confirm the following before continuing:");
        report.bullets([
            "The impact of the rollback is understood",
            "The affected teams have been notified",
            "A contingency plan is ready",
        ]);
        report.text("To proceed, call the tool again with `force: true`.");
        report.text("Tip: `dry_run: true` previews the rollback first.");
        return HandlerReport::halted(report, HaltReason::ConfirmationRequired);
    }

    report.heading(2, "Rollback");
    let extra = args.version.clone().into_iter().collect();
    let outcome = ctx.run(&Operation::Rollback, extra).await;

    if outcome.success() {
        report.heading(3, "Rollback succeeded");
        report.code(None, outcome.stdout);
        report.heading(3, "Next steps");
        report.bullets([
            "Verify the service status",
            "Check the application logs",
            "Notify the affected teams",
        ]);
    } else {
        warn!(exit_code = outcome.exit_code, timed_out = outcome.timed_out, "rollback failed");
        report.heading(3, "Rollback failed");
        report.code(None, outcome.failure_output());
        report.heading(3, "Suggested actions");
        report.bullets([
            "Check the state of the configuration version manager",
            "Analyze the failure with the `cicd_analyze` tool",
            "Consider a manual recovery",
        ]);
    }

    HandlerReport::completed(report)
}

/// List candidate versions; degrade to a static table when the version
/// manager script is unavailable.
async fn render_available_versions(ctx: &ToolContext, report: &mut Report) {
    let outcome = ctx.run(&Operation::ListVersions, vec![]).await;
    if outcome.success() && !outcome.stdout.is_empty() {
        report.code(None, outcome.stdout);
        return;
    }
    report.table(
        &["version", "date", "description"],
        vec![
            vec!["v1.0.0".to_string(), "2024-01-01".to_string(), "Initial release".to_string()],
            vec!["v1.0.1".to_string(), "2024-01-15".to_string(), "Bug fixes".to_string()],
            vec!["v1.1.0".to_string(), "2024-02-01".to_string(), "New features".to_string()],
        ],
    );
}

/// Static preview: scope, impact, caveats. No process is invoked.
fn render_preview(version: Option<&str>, report: &mut Report) {
    report.text(format!("Target version: {}", version.unwrap_or("previous version")));
    report.heading(3, "Expected changes");
    report.text("The following will be rolled back:");
    report.bullets(["Configuration files", "Deployment scripts", "Environment variables"]);
    report.heading(3, "Impact");
    report.bullets([
        "The running service will restart",
        "Features introduced after the target version become unavailable",
        "Database migrations are not rolled back automatically",
    ]);
    report.heading(3, "Caveats");
    report.bullets([
        "Ensure the database is compatible with the target version",
        "Check for incompatible API changes",
        "Notify teams that depend on this service",
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::scripted_context;

    const ENABLED: &str = "\
deploy:
  rollback_enabled: true
rollback:
  strategies: [blue-green, canary]
  auto_rollback_on_failure: true
";

    #[tokio::test]
    async fn disabled_rollback_halts_before_any_process_call() {
        let (_dir, runner, ctx) = scripted_context("deploy:\n  rollback_enabled: false\n");
        let args = RollbackArgs {
            force: true,
            list_versions: true,
            ..RollbackArgs::default()
        };
        let result = handle_rollback(&ctx, args).await;

        assert_eq!(result.halted, Some(HaltReason::RollbackDisabled));
        assert!(runner.calls().is_empty());
        assert!(result.report.render().contains("deploy.rollback_enabled"));
    }

    #[tokio::test]
    async fn listing_versions_never_executes_a_rollback() {
        let (_dir, runner, ctx) = scripted_context(ENABLED);
        runner.respond_ok("config-version-manager.sh list", "v1.0.0\nv1.1.0");

        let args = RollbackArgs {
            list_versions: true,
            ..RollbackArgs::default()
        };
        let result = handle_rollback(&ctx, args).await;

        assert_eq!(result.halted, Some(HaltReason::VersionListing));
        assert_eq!(runner.call_keys(), vec!["config-version-manager.sh list"]);
        let rendered = result.report.render();
        assert!(rendered.contains("v1.1.0"));
        assert!(rendered.contains("blue-green, canary"));
    }

    #[tokio::test]
    async fn version_listing_degrades_to_the_static_table() {
        let (_dir, runner, ctx) = scripted_context(ENABLED);
        runner.respond_err("config-version-manager.sh list", 127, "script not found");

        let args = RollbackArgs {
            list_versions: true,
            ..RollbackArgs::default()
        };
        let result = handle_rollback(&ctx, args).await;
        let rendered = result.report.render();
        assert!(rendered.contains("| v1.0.0 | 2024-01-01 | Initial release |"));
    }

    #[tokio::test]
    async fn dry_run_previews_without_invoking_anything() {
        let (_dir, runner, ctx) = scripted_context(ENABLED);
        let args = RollbackArgs {
            dry_run: true,
            version: Some("v1.0.1".to_string()),
            ..RollbackArgs::default()
        };
        let result = handle_rollback(&ctx, args).await;

        assert_eq!(result.halted, Some(HaltReason::DryRunComplete));
        assert!(runner.calls().is_empty());
        let rendered = result.report.render();
        assert!(rendered.contains("Target version: v1.0.1"));
        assert!(rendered.contains("Database migrations are not rolled back automatically"));
    }

    #[tokio::test]
    async fn unforced_rollback_halts_for_confirmation() {
        let (_dir, runner, ctx) = scripted_context(ENABLED);
        let result = handle_rollback(&ctx, RollbackArgs::default()).await;

        assert_eq!(result.halted, Some(HaltReason::ConfirmationRequired));
        assert!(runner.calls().is_empty());
        assert!(result.report.render().contains("force: true"));
    }

    #[tokio::test]
    async fn forced_rollback_passes_the_target_version() {
        let (_dir, runner, ctx) = scripted_context(ENABLED);
        runner.respond_ok("aicd.sh rollback", "rolled back to v1.0.1");

        let args = RollbackArgs {
            force: true,
            version: Some("v1.0.1".to_string()),
            ..RollbackArgs::default()
        };
        let result = handle_rollback(&ctx, args).await;

        assert!(result.halted.is_none());
        let call = runner.calls().into_iter().next().expect("rollback call");
        assert_eq!(call.args, vec!["rollback", "v1.0.1"]);
        assert!(result.report.render().contains("Rollback succeeded"));
    }

    #[tokio::test]
    async fn failed_rollback_renders_recovery_guidance() {
        let (_dir, runner, ctx) = scripted_context(ENABLED);
        runner.respond_err("aicd.sh rollback", 1, "no snapshot");

        let args = RollbackArgs {
            force: true,
            ..RollbackArgs::default()
        };
        let result = handle_rollback(&ctx, args).await;
        let rendered = result.report.render();
        assert!(rendered.contains("Rollback failed"));
        assert!(rendered.contains("no snapshot"));
        assert!(rendered.contains("cicd_analyze"));
    }

    #[tokio::test]
    async fn non_semver_target_gets_an_advisory_note() {
        let (_dir, _runner, ctx) = scripted_context(ENABLED);
        let args = RollbackArgs {
            dry_run: true,
            version: Some("release-candidate".to_string()),
            ..RollbackArgs::default()
        };
        let result = handle_rollback(&ctx, args).await;
        assert!(result.report.render().contains("does not follow the vMAJOR.MINOR.PATCH convention"));
    }
}
