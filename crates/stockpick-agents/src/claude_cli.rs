//! One-shot `claude -p` invocations that ask for a single pick.

use std::time::Duration;

use serde::Deserialize;
use stockpick_models::PickRequest;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::prompts::{pick_system_prompt, pick_user_prompt};

/// The JSON envelope printed by `claude -p --output-format json`.
#[derive(Debug, Deserialize)]
struct CliEnvelope {
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    result: Option<String>,
}

/// Arguments for one pick attempt. The pick is a single answer, so tool use
/// and multi-turn conversations are switched off.
pub fn pick_args(request: &PickRequest, model: &str) -> Vec<String> {
    vec![
        "-p".to_string(),
        pick_user_prompt(request),
        "--system-prompt".to_string(),
        pick_system_prompt(),
        "--model".to_string(),
        model.to_string(),
        "--max-turns".to_string(),
        "1".to_string(),
        "--output-format".to_string(),
        "json".to_string(),
    ]
}

/// Pull the answer text out of the CLI's JSON envelope.
pub fn pick_text_from_envelope(stdout: &str) -> Result<String, AgentError> {
    if stdout.trim().is_empty() {
        return Err(AgentError::EmptyResponse);
    }

    let envelope: CliEnvelope = serde_json::from_str(stdout.trim())?;
    let text = envelope.result.unwrap_or_default();
    if envelope.is_error {
        return Err(AgentError::Cli(format!("claude reported an error: {text}")));
    }
    if text.trim().is_empty() {
        return Err(AgentError::EmptyResponse);
    }
    Ok(text)
}

/// Ask the `claude` CLI for one pick and return its raw answer text.
///
/// The child process is killed if the timeout elapses first.
pub async fn request_pick(
    request: &PickRequest,
    model: &str,
    timeout: Duration,
) -> Result<String, AgentError> {
    debug!(
        model = %model,
        worker = request.worker_id,
        attempt = request.attempt,
        excluded = request.excluded.len(),
        "Invoking claude CLI"
    );

    let output = tokio::time::timeout(
        timeout,
        Command::new("claude")
            .args(pick_args(request, model))
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| AgentError::Timeout(timeout.as_secs()))?
    .map_err(|e| AgentError::Cli(format!("Failed to spawn claude: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            worker = request.worker_id,
            attempt = request.attempt,
            status = %output.status,
            stderr = %stderr,
            "Claude CLI failed"
        );
        return Err(AgentError::Cli(format!(
            "claude exited {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    pick_text_from_envelope(&String::from_utf8_lossy(&output.stdout))
}

/// Check if the `claude` CLI is available on the system.
pub async fn check_cli_available() -> bool {
    match Command::new("claude").arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
