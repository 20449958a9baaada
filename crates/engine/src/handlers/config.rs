//! Config handler: show, compare, validate, merge, and diff.

use serde_json::Value;

use aicd_types::{ConfigAction, ConfigArgs, Environment, ReportFormat};

use crate::catalog::Operation;
use crate::config::{display_value, flatten, lookup};
use crate::handlers::{ToolContext, timestamp};
use crate::report::{HandlerReport, Report};

/// Cell rendered for a key missing on one side of a comparison.
const UNDEFINED: &str = "(undefined)";

/// Run the requested config sub-action.
pub async fn handle_config(ctx: &ToolContext, args: ConfigArgs) -> HandlerReport {
    let mut report = Report::titled("Configuration Management");
    report.quote(format!("Time: {}", timestamp()));
    report.quote(format!("Action: {}", args.action.as_str()));

    match args.action {
        ConfigAction::Show => show_config(ctx, &args, &mut report),
        ConfigAction::Compare => compare_environments(ctx, &args, &mut report),
        ConfigAction::Validate => validate_config(ctx, &args, &mut report).await,
        ConfigAction::Merge => merge_config(ctx, &args, &mut report).await,
        ConfigAction::Diff => diff_config(ctx, &args, &mut report).await,
    }

    HandlerReport::completed(report)
}

/// A `config` operand addresses a node when it looks like a dotted
/// identifier rather than a file: no path separator, no YAML suffix.
fn is_node_path(operand: &str) -> bool {
    !operand.contains('/') && !operand.ends_with(".yaml") && !operand.ends_with(".yml")
}

fn show_config(ctx: &ToolContext, args: &ConfigArgs, report: &mut Report) {
    report.heading(2, "Configuration contents");

    let value = match &args.config {
        Some(operand) if is_node_path(operand) => {
            report.heading(3, format!("Node: {operand}"));
            match ctx.config().load_central() {
                Ok(central) => match lookup(&central, operand) {
                    Some(node) => node.clone(),
                    None => {
                        report.text(format!("Node '{operand}' is not present in the central configuration."));
                        return;
                    }
                },
                Err(error) => {
                    report.text(format!("Failed to read configuration: {error} ({})", error.remediation()));
                    return;
                }
            }
        }
        Some(operand) => {
            report.heading(3, format!("File: {operand}"));
            match ctx.config().load_file(operand) {
                Ok(document) => document,
                Err(error) => {
                    report.text(format!("Failed to read configuration: {error} ({})", error.remediation()));
                    return;
                }
            }
        }
        None => {
            report.heading(3, "File: central-config.yaml");
            match ctx.config().load_central() {
                Ok(document) => document,
                Err(error) => {
                    report.text(format!("Failed to read configuration: {error} ({})", error.remediation()));
                    return;
                }
            }
        }
    };

    render_value(&value, args.format, report);
}

fn render_value(value: &Value, format: ReportFormat, report: &mut Report) {
    match format {
        ReportFormat::Json => {
            let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
            report.code(Some("json"), body);
        }
        ReportFormat::Table if value.is_object() => {
            let rows = flatten(value).into_iter().map(|(key, rendered)| vec![key, rendered]).collect();
            report.table(&["key", "value"], rows);
        }
        _ => {
            let body = serde_yaml::to_string(value).unwrap_or_else(|_| "null\n".to_string());
            report.code(Some("yaml"), body);
        }
    }
}

fn compare_environments(ctx: &ToolContext, args: &ConfigArgs, report: &mut Report) {
    report.heading(2, "Configuration comparison");

    let (Some(env1), Some(env2)) = (&args.env1, &args.env2) else {
        report.text("Two environments are required for a comparison.");
        report.text(format!(
            "Available environments: {}",
            Environment::ALL.map(|environment| environment.as_str()).join(", ")
        ));
        return;
    };

    report.text(format!("Comparing **{env1}** with **{env2}**"));

    let resolve = |environment: &str| -> Result<serde_json::Map<String, Value>, String> {
        ctx.config()
            .environment_overrides(environment)
            .map(|overrides| overrides.as_object().cloned().unwrap_or_default())
            .map_err(|error| format!("{error} ({})", error.remediation()))
    };

    let overrides1 = match resolve(env1) {
        Ok(map) => map,
        Err(error) => {
            report.text(format!("Comparison failed: {error}"));
            return;
        }
    };
    let overrides2 = match resolve(env2) {
        Ok(map) => map,
        Err(error) => {
            report.text(format!("Comparison failed: {error}"));
            return;
        }
    };

    // Symmetric key union: every key of either side appears exactly once,
    // left-side order first.
    let mut keys: Vec<&String> = overrides1.keys().collect();
    keys.extend(overrides2.keys().filter(|key| !overrides1.contains_key(*key)));

    let rows = keys
        .into_iter()
        .map(|key| {
            let left = overrides1.get(key);
            let right = overrides2.get(key);
            let verdict = if left == right { "same" } else { "**different**" };
            vec![
                key.clone(),
                left.map(display_value).unwrap_or_else(|| UNDEFINED.to_string()),
                right.map(display_value).unwrap_or_else(|| UNDEFINED.to_string()),
                verdict.to_string(),
            ]
        })
        .collect();

    report.table(&["key", env1.as_str(), env2.as_str(), "verdict"], rows);
}

async fn validate_config(ctx: &ToolContext, args: &ConfigArgs, report: &mut Report) {
    report.heading(2, "Configuration validation");

    let extra = args.config.clone().into_iter().collect();
    let outcome = ctx.run(&Operation::ValidateConfigFile, extra).await;

    if outcome.success() {
        report.heading(3, "Validation passed");
        if !outcome.stdout.is_empty() {
            report.code(None, outcome.stdout);
        }
    } else {
        report.heading(3, "Validation failed");
        report.code(None, outcome.failure_output());
    }
}

async fn merge_config(ctx: &ToolContext, args: &ConfigArgs, report: &mut Report) {
    report.heading(2, "Configuration merge");

    let Some(environment) = &args.env1 else {
        report.text("An environment is required for a merge.");
        report.text(format!(
            "Available environments: {}",
            Environment::ALL.map(|environment| environment.as_str()).join(", ")
        ));
        return;
    };

    let mut extra = vec!["-e".to_string(), environment.clone()];
    match &args.config {
        Some(output_path) => {
            extra.push("-O".to_string());
            extra.push(output_path.clone());
        }
        None => extra.push("--dry-run".to_string()),
    }

    let outcome = ctx.run(&Operation::MergeConfig, extra).await;
    if outcome.success() {
        report.heading(3, format!("Environment: {environment}"));
        match &args.config {
            Some(output_path) => report.text(format!("Merged configuration written to: {output_path}")),
            None => {
                report.heading(3, "Merge preview");
                report.code(Some("yaml"), outcome.stdout);
            }
        }
    } else {
        report.heading(3, "Merge failed");
        report.code(None, outcome.failure_output());
    }
}

async fn diff_config(ctx: &ToolContext, args: &ConfigArgs, report: &mut Report) {
    report.heading(2, "Configuration diff");

    let (Some(file1), Some(file2)) = (&args.env1, &args.env2) else {
        report.text("Two configuration files are required for a diff.");
        return;
    };

    let outcome = ctx.run(&Operation::DiffConfig, vec![file1.clone(), file2.clone()]).await;
    if outcome.stdout.is_empty() {
        report.text("The two configuration files are identical.");
    } else {
        report.code(Some("diff"), outcome.stdout);
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
    replicas: 1
  production:
    log_level: warn
    cdn: true
";

    fn config_args(action: ConfigAction) -> ConfigArgs {
        ConfigArgs {
            action,
            config: None,
            env1: None,
            env2: None,
            format: ReportFormat::default(),
        }
    }

    #[tokio::test]
    async fn show_resolves_dotted_node_paths() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        let args = ConfigArgs {
            config: Some("project.name".to_string()),
            ..config_args(ConfigAction::Show)
        };
        let result = handle_config(&ctx, args).await;

        assert!(runner.calls().is_empty());
        let rendered = result.report.render();
        assert!(rendered.contains("Node: project.name"));
        assert!(rendered.contains("demo"));
    }

    #[tokio::test]
    async fn show_reports_absent_nodes_without_failing() {
        let (_dir, _runner, ctx) = scripted_context(CENTRAL);
        let args = ConfigArgs {
            config: Some("project.owner".to_string()),
            ..config_args(ConfigAction::Show)
        };
        let result = handle_config(&ctx, args).await;
        assert!(result.report.render().contains("is not present"));
    }

    #[tokio::test]
    async fn show_renders_files_in_the_requested_format() {
        let (dir, _runner, ctx) = scripted_context(CENTRAL);
        std::fs::write(dir.path().join("config/extra.yaml"), "service:\n  port: 8080\n").expect("write extra");

        let args = ConfigArgs {
            config: Some("extra.yaml".to_string()),
            format: ReportFormat::Table,
            ..config_args(ConfigAction::Show)
        };
        let result = handle_config(&ctx, args).await;
        let rendered = result.report.render();
        assert!(rendered.contains("File: extra.yaml"));
        assert!(rendered.contains("| service.port | 8080 |"));

        let args = ConfigArgs {
            format: ReportFormat::Json,
            ..config_args(ConfigAction::Show)
        };
        let result = handle_config(&ctx, args).await;
        assert!(result.report.render().contains("```json"));
    }

    #[tokio::test]
    async fn compare_covers_the_symmetric_key_union() {
        let (_dir, _runner, ctx) = scripted_context(CENTRAL);
        let args = ConfigArgs {
            env1: Some("staging".to_string()),
            env2: Some("production".to_string()),
            ..config_args(ConfigAction::Compare)
        };
        let result = handle_config(&ctx, args).await;
        let rendered = result.report.render();

        assert!(rendered.contains("| log_level | debug | warn | **different** |"));
        assert!(rendered.contains("| replicas | 1 | (undefined) | **different** |"));
        assert!(rendered.contains("| cdn | (undefined) | true | **different** |"));
    }

    #[tokio::test]
    async fn compare_reports_equal_values_as_same() {
        let central = "\
environments:
  staging:
    log_level: info
  production:
    log_level: info
";
        let (_dir, _runner, ctx) = scripted_context(central);
        let args = ConfigArgs {
            env1: Some("staging".to_string()),
            env2: Some("production".to_string()),
            ..config_args(ConfigAction::Compare)
        };
        let result = handle_config(&ctx, args).await;
        assert!(result.report.render().contains("| log_level | info | info | same |"));
    }

    #[tokio::test]
    async fn compare_without_both_environments_prompts_instead_of_failing() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        let args = ConfigArgs {
            env1: Some("staging".to_string()),
            ..config_args(ConfigAction::Compare)
        };
        let result = handle_config(&ctx, args).await;
        assert!(runner.calls().is_empty());
        assert!(result.report.render().contains("development, staging, production"));
    }

    #[tokio::test]
    async fn validate_delegates_to_the_validation_script() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        runner.respond_ok("validate-config.sh extra.yaml", "extra.yaml: ok");

        let args = ConfigArgs {
            config: Some("extra.yaml".to_string()),
            ..config_args(ConfigAction::Validate)
        };
        let result = handle_config(&ctx, args).await;
        assert_eq!(runner.call_keys(), vec!["validate-config.sh extra.yaml"]);
        let rendered = result.report.render();
        assert!(rendered.contains("Validation passed"));
        assert!(rendered.contains("extra.yaml: ok"));
    }

    #[tokio::test]
    async fn merge_previews_without_an_output_path() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        runner.respond_ok("config-merger.sh -e", "log_level: debug");

        let args = ConfigArgs {
            env1: Some("staging".to_string()),
            ..config_args(ConfigAction::Merge)
        };
        let result = handle_config(&ctx, args).await;
        let call = runner.calls().into_iter().next().expect("merge call");
        assert_eq!(call.args, vec!["-e", "staging", "--dry-run"]);
        assert!(result.report.render().contains("Merge preview"));
    }

    #[tokio::test]
    async fn merge_writes_to_the_requested_output_path() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        runner.respond_ok("config-merger.sh -e", "");

        let args = ConfigArgs {
            env1: Some("staging".to_string()),
            config: Some("merged.yaml".to_string()),
            ..config_args(ConfigAction::Merge)
        };
        let result = handle_config(&ctx, args).await;
        let call = runner.calls().into_iter().next().expect("merge call");
        assert_eq!(call.args, vec!["-e", "staging", "-O", "merged.yaml"]);
        assert!(result.report.render().contains("written to: merged.yaml"));
    }

    #[tokio::test]
    async fn diff_renders_output_or_reports_identical_files() {
        let (_dir, runner, ctx) = scripted_context(CENTRAL);
        runner.respond_ok("config-merger.sh --diff", "-log_level: info\n+log_level: warn");

        let args = ConfigArgs {
            env1: Some("a.yaml".to_string()),
            env2: Some("b.yaml".to_string()),
            ..config_args(ConfigAction::Diff)
        };
        let result = handle_config(&ctx, args).await;
        let call = runner.calls().into_iter().next().expect("diff call");
        assert_eq!(call.args, vec!["--diff", "a.yaml", "b.yaml"]);
        assert!(result.report.render().contains("```diff"));

        let (_dir2, runner2, ctx2) = scripted_context(CENTRAL);
        runner2.respond_ok("config-merger.sh --diff", "");
        let args = ConfigArgs {
            env1: Some("a.yaml".to_string()),
            env2: Some("a.yaml".to_string()),
            ..config_args(ConfigAction::Diff)
        };
        let result = handle_config(&ctx2, args).await;
        assert!(result.report.render().contains("identical"));
    }
}
