//! The `cicd://` resource tree: a read-through over the project's
//! configuration documents, pipeline sections, template directories, and
//! script inventory.

use rmcp::model::{AnnotateAble, ListResourcesResult, RawResource, ReadResourceResult, ResourceContents};
use serde_json::{Value, json};

use aicd_engine::{ConfigAccessor, ProjectPaths, lookup};

use crate::server::errors::{internal_error, invalid_params_error, not_found_error};

const URI_PREFIX: &str = "cicd://";

const YAML_MIME: &str = "application/x-yaml";
const JSON_MIME: &str = "application/json";

const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];
const TEMPLATE_KINDS: [&str; 3] = ["github-actions", "docker", "kubernetes"];

/// Build the full resource listing.
pub fn list_resources() -> ListResourcesResult {
    let mut resources = vec![
        resource(
            "cicd://config/central",
            "config.central",
            Some("Central configuration"),
            Some("The central CI/CD configuration document (central-config.yaml)"),
            YAML_MIME,
        ),
        resource(
            "cicd://config/ai",
            "config.ai",
            Some("AI configuration"),
            Some("AI supervision configuration (ai-config.yaml)"),
            YAML_MIME,
        ),
    ];

    for environment in ENVIRONMENTS {
        resources.push(resource(
            &format!("cicd://config/environment/{environment}"),
            &format!("config.environment.{environment}"),
            Some(&format!("{environment} environment configuration")),
            Some(&format!("Configuration overrides for the {environment} environment")),
            YAML_MIME,
        ));
    }

    resources.push(resource(
        "cicd://pipeline/build",
        "pipeline.build",
        Some("Build pipeline"),
        Some("Build configuration and commands"),
        JSON_MIME,
    ));
    resources.push(resource(
        "cicd://pipeline/test",
        "pipeline.test",
        Some("Test pipeline"),
        Some("Test configuration and coverage thresholds"),
        JSON_MIME,
    ));
    resources.push(resource(
        "cicd://pipeline/deploy",
        "pipeline.deploy",
        Some("Deploy pipeline"),
        Some("Deployment configuration and rollback strategy"),
        JSON_MIME,
    ));

    for kind in TEMPLATE_KINDS {
        resources.push(resource(
            &format!("cicd://templates/{kind}"),
            &format!("templates.{kind}"),
            Some(&format!("{kind} templates")),
            Some(&format!("Available {kind} templates")),
            JSON_MIME,
        ));
    }

    resources.push(resource(
        "cicd://scripts/list",
        "scripts.list",
        Some("Script inventory"),
        Some("The CI/CD scripts available to the toolchain"),
        JSON_MIME,
    ));

    ListResourcesResult::with_all_items(resources)
}

/// Read one resource URI into text content.
pub fn read_resource(paths: &ProjectPaths, uri: &str) -> Result<ReadResourceResult, rmcp::model::ErrorData> {
    let Some(resource_path) = uri.strip_prefix(URI_PREFIX) else {
        return Err(not_found_error(
            "RESOURCE_URI_INVALID",
            format!("invalid resource URI: {uri}"),
            json!({ "uri": uri }),
            "Use a cicd:// URI from resources/list.",
        ));
    };

    let parts: Vec<&str> = resource_path.split('/').collect();
    match parts.as_slice() {
        ["config", rest @ ..] => read_config_resource(paths, uri, rest),
        ["pipeline", pipeline] => read_pipeline_resource(paths, uri, pipeline),
        ["templates", kind] => Ok(text_resource(uri, JSON_MIME, template_listing(paths, kind))),
        ["scripts", "list"] => Ok(text_resource(uri, JSON_MIME, script_listing(paths))),
        _ => Err(not_found_error(
            "RESOURCE_NOT_FOUND",
            format!("resource '{uri}' was not found"),
            json!({ "uri": uri }),
            "Call resources/list to inspect supported resource URIs.",
        )),
    }
}

fn read_config_resource(paths: &ProjectPaths, uri: &str, parts: &[&str]) -> Result<ReadResourceResult, rmcp::model::ErrorData> {
    match parts {
        ["central"] => read_file_resource(uri, &paths.central_config()),
        ["ai"] => read_file_resource(uri, &paths.ai_config()),
        ["environment", environment] => {
            if environment.trim().is_empty() {
                return Err(invalid_params_error(
                    "RESOURCE_ENVIRONMENT_MISSING",
                    "environment resource URI is missing an environment name",
                    json!({ "uri": uri }),
                    "Use cicd://config/environment/{name}.",
                ));
            }
            // The dedicated override file wins; otherwise the override is
            // derived from the central document's environments section.
            let dedicated = paths.environment_file(environment);
            if dedicated.is_file() {
                return read_file_resource(uri, &dedicated);
            }
            let overrides = ConfigAccessor::new(paths.clone()).environment_overrides(environment).map_err(|error| {
                internal_error(
                    "CONFIG_RESOURCE_READ_FAILED",
                    error.to_string(),
                    json!({ "uri": uri, "environment": environment }),
                    error.remediation(),
                )
            })?;
            let rendered = serde_yaml::to_string(&overrides).unwrap_or_else(|_| "{}\n".to_string());
            Ok(text_resource(uri, YAML_MIME, rendered))
        }
        _ => Err(not_found_error(
            "RESOURCE_NOT_FOUND",
            format!("resource '{uri}' was not found"),
            json!({ "uri": uri }),
            "Call resources/list to inspect supported resource URIs.",
        )),
    }
}

fn read_pipeline_resource(paths: &ProjectPaths, uri: &str, pipeline: &str) -> Result<ReadResourceResult, rmcp::model::ErrorData> {
    let central = ConfigAccessor::new(paths.clone()).load_central().map_err(|error| {
        internal_error(
            "CONFIG_RESOURCE_READ_FAILED",
            error.to_string(),
            json!({ "uri": uri }),
            error.remediation(),
        )
    })?;

    let section = |name: &str| lookup(&central, name).cloned().unwrap_or_else(|| json!({}));
    let payload = match pipeline {
        "build" => section("build"),
        "test" => section("test"),
        "deploy" => json!({
            "deploy": section("deploy"),
            "rollback": section("rollback"),
        }),
        _ => {
            return Err(not_found_error(
                "RESOURCE_NOT_FOUND",
                format!("unknown pipeline resource: {pipeline}"),
                json!({ "uri": uri }),
                "Use pipeline/build, pipeline/test, or pipeline/deploy.",
            ));
        }
    };

    Ok(text_resource(uri, JSON_MIME, pretty(&payload)))
}

fn template_listing(paths: &ProjectPaths, kind: &str) -> String {
    let directory = paths.templates_dir(kind);
    let Ok(entries) = std::fs::read_dir(&directory) else {
        return pretty(&json!({
            "error": format!("template directory not found: {kind}"),
            "templates": [],
        }));
    };

    let mut templates: Vec<Value> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            json!({
                "name": name,
                "path": format!("templates/{kind}/{name}"),
                "description": template_description(kind, &name),
            })
        })
        .collect();
    templates.sort_by_key(|template| template["name"].as_str().unwrap_or_default().to_string());

    pretty(&json!({ "templates": templates }))
}

fn script_listing(paths: &ProjectPaths) -> String {
    let Ok(entries) = std::fs::read_dir(paths.scripts_dir()) else {
        return pretty(&json!({ "error": "scripts directory not found" }));
    };

    let mut scripts: Vec<Value> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.ends_with(".sh").then(|| {
                json!({
                    "name": name,
                    "description": script_description(&name),
                    "usage": format!("./{name} --help"),
                })
            })
        })
        .collect();
    scripts.sort_by_key(|script| script["name"].as_str().unwrap_or_default().to_string());

    pretty(&json!({ "scripts": scripts }))
}

fn template_description(kind: &str, file: &str) -> String {
    let known = match (kind, file) {
        ("github-actions", "ci-cd.yaml") => Some("Full CI/CD pipeline workflow"),
        ("github-actions", "pr-validation.yaml") => Some("Pull request validation workflow"),
        ("github-actions", "release.yaml") => Some("Release publication workflow"),
        ("docker", "Dockerfile.node") => Some("Multi-stage Node.js build"),
        ("docker", "Dockerfile.python") => Some("Multi-stage Python build"),
        ("docker", "docker-compose.dev.yaml") => Some("Development compose stack"),
        ("docker", "docker-compose.prod.yaml") => Some("Production compose stack"),
        ("kubernetes", "deployment.yaml") => Some("Kubernetes Deployment manifest"),
        ("kubernetes", "ingress.yaml") => Some("Kubernetes Ingress manifest"),
        ("kubernetes", "service.yaml") => Some("Kubernetes Service manifest"),
        _ => None,
    };
    known.map(str::to_string).unwrap_or_else(|| format!("{kind} template file"))
}

fn script_description(file: &str) -> String {
    let known = match file {
        "aicd.sh" => Some("Unified CI/CD command-line entry point"),
        "ai-supervisor.sh" => Some("AI supervision: analysis and recommendations"),
        "config-wizard.sh" => Some("Interactive configuration generator"),
        "config-merger.sh" => Some("Deep-merge of YAML configuration"),
        "lint.sh" => Some("ShellCheck static analysis"),
        "validate-config.sh" => Some("Configuration file validation"),
        "log-manager.sh" => Some("Log query and rotation"),
        "api-docs-generator.sh" => Some("API documentation extraction"),
        "config-version-manager.sh" => Some("Configuration version control"),
        "resource-monitoring.sh" => Some("System resource monitoring"),
        "performance-benchmark.sh" => Some("Performance benchmarking"),
        _ => None,
    };
    known.map(str::to_string).unwrap_or_else(|| "CI/CD toolchain script".to_string())
}

fn read_file_resource(uri: &str, path: &std::path::Path) -> Result<ReadResourceResult, rmcp::model::ErrorData> {
    let content = std::fs::read_to_string(path).map_err(|error| {
        not_found_error(
            "CONFIG_RESOURCE_READ_FAILED",
            format!("failed to read {}: {error}", path.display()),
            json!({ "uri": uri, "path": path.display().to_string() }),
            "Check that the config directory exists and the file is readable.",
        )
    })?;
    Ok(text_resource(uri, YAML_MIME, content))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn resource(uri: &str, name: &str, title: Option<&str>, description: Option<&str>, mime_type: &str) -> rmcp::model::Resource {
    RawResource {
        uri: uri.to_string(),
        name: name.to_string(),
        title: title.map(ToString::to_string),
        description: description.map(ToString::to_string),
        mime_type: Some(mime_type.to_string()),
        size: None,
        icons: None,
        meta: None,
    }
    .no_annotation()
}

fn text_resource(uri: &str, mime_type: &str, text: String) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: uri.to_string(),
            mime_type: Some(mime_type.to_string()),
            text,
            meta: None,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(result: &ReadResourceResult) -> String {
        match &result.contents[0] {
            ResourceContents::TextResourceContents { text, .. } => text.clone(),
            other => panic!("expected text contents, got {other:?}"),
        }
    }

    fn project() -> (tempfile::TempDir, ProjectPaths) {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("config")).expect("config dir");
        std::fs::write(
            dir.path().join("config/central-config.yaml"),
            "build:\n  commands: [make]\nenvironments:\n  staging:\n    log_level: debug\n",
        )
        .expect("write central");
        let paths = ProjectPaths::new(dir.path());
        (dir, paths)
    }

    #[test]
    fn listing_covers_every_resource_family() {
        let listing = list_resources();
        let uris: Vec<&str> = listing.resources.iter().map(|resource| resource.uri.as_str()).collect();
        assert!(uris.contains(&"cicd://config/central"));
        assert!(uris.contains(&"cicd://config/environment/staging"));
        assert!(uris.contains(&"cicd://pipeline/deploy"));
        assert!(uris.contains(&"cicd://templates/docker"));
        assert!(uris.contains(&"cicd://scripts/list"));
    }

    #[test]
    fn central_config_reads_through_to_the_file() {
        let (_dir, paths) = project();
        let result = read_resource(&paths, "cicd://config/central").expect("read");
        assert!(text_of(&result).contains("log_level: debug"));
    }

    #[test]
    fn environment_resource_prefers_the_dedicated_file() {
        let (dir, paths) = project();
        std::fs::create_dir_all(dir.path().join("config/environment")).expect("env dir");
        std::fs::write(dir.path().join("config/environment/staging.yaml"), "log_level: trace\n").expect("write override");

        let result = read_resource(&paths, "cicd://config/environment/staging").expect("read");
        assert!(text_of(&result).contains("trace"));
    }

    #[test]
    fn environment_resource_derives_from_central_without_a_file() {
        let (_dir, paths) = project();
        let result = read_resource(&paths, "cicd://config/environment/staging").expect("read");
        assert!(text_of(&result).contains("log_level: debug"));
    }

    #[test]
    fn pipeline_resources_project_central_sections() {
        let (_dir, paths) = project();
        let build = read_resource(&paths, "cicd://pipeline/build").expect("read");
        assert!(text_of(&build).contains("make"));

        let deploy = read_resource(&paths, "cicd://pipeline/deploy").expect("read");
        let text = text_of(&deploy);
        assert!(text.contains("\"deploy\""));
        assert!(text.contains("\"rollback\""));
    }

    #[test]
    fn template_listing_degrades_when_the_directory_is_missing() {
        let (_dir, paths) = project();
        let result = read_resource(&paths, "cicd://templates/docker").expect("read");
        assert!(text_of(&result).contains("template directory not found"));
    }

    #[test]
    fn script_listing_reports_only_shell_scripts() {
        let (dir, paths) = project();
        std::fs::create_dir_all(dir.path().join("scripts")).expect("scripts dir");
        std::fs::write(dir.path().join("scripts/aicd.sh"), "#!/bin/sh\n").expect("write script");
        std::fs::write(dir.path().join("scripts/README.md"), "docs").expect("write readme");

        let result = read_resource(&paths, "cicd://scripts/list").expect("read");
        let text = text_of(&result);
        assert!(text.contains("aicd.sh"));
        assert!(text.contains("Unified CI/CD command-line entry point"));
        assert!(!text.contains("README.md"));
    }

    #[test]
    fn unknown_uris_are_structured_not_found_errors() {
        let (_dir, paths) = project();
        assert!(read_resource(&paths, "cicd://nope/what").is_err());
        assert!(read_resource(&paths, "other://config/central").is_err());
    }
}
