//! External process execution.
//!
//! One runner call spawns exactly one process. Every failure mode — spawn
//! error, missing executable, non-zero exit, missed deadline — normalizes
//! into an [`ExecOutcome`]; retry policy, if any, belongs to the calling
//! handler.

use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;
use tracing::{debug, warn};

use aicd_types::{ExecOutcome, ExecRequest};

/// Marker variable telling invoked scripts they run under the orchestrator,
/// so they can suppress interactive prompts.
pub const MCP_MODE_ENV: &str = "AICD_MCP_MODE";

/// Captured output cap per stream; anything beyond is truncated, not an error.
const OUTPUT_CAP_BYTES: usize = 10 * 1024 * 1024;

/// Execute a single external command.
///
/// Production code uses [`ShellRunner`]; tests and previews use
/// [`ScriptedRunner`] to avoid external side effects.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, request: &ExecRequest) -> ExecOutcome;
}

/// Runner that spawns real processes via tokio.
#[derive(Debug, Default)]
pub struct ShellRunner;

#[async_trait]
impl ScriptRunner for ShellRunner {
    async fn run(&self, request: &ExecRequest) -> ExecOutcome {
        if let Err(diagnostic) = verify_executable(request) {
            warn!(command = %request.command.display(), "command not runnable");
            return ExecOutcome::spawn_failure(diagnostic);
        }

        let mut command = Command::new(&request.command);
        command
            .args(&request.args)
            .current_dir(&request.cwd)
            .env(MCP_MODE_ENV, "true")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &request.env {
            command.env(key, value);
        }

        debug!(
            command = %request.command.display(),
            args = ?request.args,
            timeout_ms = request.timeout.as_millis() as u64,
            "spawning external command"
        );

        let child = match command.spawn() {
            Ok(child) => child,
            Err(error) => {
                return ExecOutcome::spawn_failure(format!("failed to spawn {}: {error}", request.command.display()));
            }
        };

        // kill_on_drop terminates the child when the timeout drops the
        // wait future, so nothing is left dangling past the deadline.
        match tokio::time::timeout(request.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => ExecOutcome {
                stdout: capture(&output.stdout),
                stderr: capture(&output.stderr),
                exit_code: output.status.code().unwrap_or(-1),
                timed_out: false,
            },
            Ok(Err(error)) => ExecOutcome::spawn_failure(format!("failed to collect output from {}: {error}", request.command.display())),
            Err(_elapsed) => {
                warn!(
                    command = %request.command.display(),
                    timeout_ms = request.timeout.as_millis() as u64,
                    "command killed at deadline"
                );
                ExecOutcome::timeout(String::new(), String::new())
            }
        }
    }
}

fn verify_executable(request: &ExecRequest) -> Result<(), String> {
    let metadata = std::fs::metadata(&request.command)
        .map_err(|_| format!("script not found or not executable: {}", request.command.display()))?;
    if !metadata.is_file() {
        return Err(format!("script not found or not executable: {}", request.command.display()));
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(format!("script not found or not executable: {}", request.command.display()));
        }
    }
    Ok(())
}

fn capture(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(OUTPUT_CAP_BYTES)]);
    text.trim_end().to_string()
}

/// Scripted runner returning canned outcomes without spawning anything.
///
/// Responses are keyed by `"<script> <first-arg>"`, falling back to the
/// bare script name. Every request is recorded so tests can assert which
/// external calls a decision tree made, and in what order.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, ExecOutcome>>,
    calls: Mutex<Vec<ExecRequest>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned outcome for a `"<script> <first-arg>"` or bare
    /// `"<script>"` key.
    pub fn respond(&self, key: &str, outcome: ExecOutcome) {
        self.responses.lock().expect("responses lock").insert(key.to_string(), outcome);
    }

    /// Convenience for a zero-exit response with the given stdout.
    pub fn respond_ok(&self, key: &str, stdout: &str) {
        self.respond(
            key,
            ExecOutcome {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: 0,
                timed_out: false,
            },
        );
    }

    /// Convenience for a failing response with the given stderr.
    pub fn respond_err(&self, key: &str, exit_code: i32, stderr: &str) {
        self.respond(
            key,
            ExecOutcome {
                stdout: String::new(),
                stderr: stderr.to_string(),
                exit_code,
                timed_out: false,
            },
        );
    }

    /// Every request this runner has received, in order.
    pub fn calls(&self) -> Vec<ExecRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// The `"<script> <first-arg>"` key of every recorded request.
    pub fn call_keys(&self) -> Vec<String> {
        self.calls().iter().map(request_key).collect()
    }
}

fn request_key(request: &ExecRequest) -> String {
    let script = request
        .command
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match request.args.first() {
        Some(first) => format!("{script} {first}"),
        None => script,
    }
}

#[async_trait]
impl ScriptRunner for ScriptedRunner {
    async fn run(&self, request: &ExecRequest) -> ExecOutcome {
        self.calls.lock().expect("calls lock").push(request.clone());
        let responses = self.responses.lock().expect("responses lock");
        let key = request_key(request);
        if let Some(outcome) = responses.get(&key) {
            return outcome.clone();
        }
        let script = request
            .command
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        responses
            .get(&script)
            .cloned()
            .unwrap_or_else(|| ExecOutcome::spawn_failure(format!("no scripted response for {key}")))
    }
}
