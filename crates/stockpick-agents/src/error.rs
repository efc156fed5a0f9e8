use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Oracle timed out after {0} seconds")]
    Timeout(u64),

    #[error("Oracle returned an empty response")]
    EmptyResponse,

    #[error("Unreadable CLI output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
}
