use std::time::Duration;

use async_trait::async_trait;
use stockpick_models::PickRequest;

use crate::claude_cli::request_pick;
use crate::error::AgentError;

/// Source of free-text ticker picks. Mockable for testing.
///
/// One call per attempt; implementations do not retry.
#[async_trait]
pub trait CandidateOracle: Send + Sync {
    fn name(&self) -> &str;

    async fn propose(&self, request: &PickRequest) -> Result<String, AgentError>;
}

/// A candidate oracle that invokes the Claude CLI.
pub struct ClaudeCandidateOracle {
    pub model: String,
    pub timeout: Duration,
}

impl ClaudeCandidateOracle {
    pub fn new(model: String, timeout: Duration) -> Self {
        Self { model, timeout }
    }
}

#[async_trait]
impl CandidateOracle for ClaudeCandidateOracle {
    fn name(&self) -> &str {
        "claude"
    }

    async fn propose(&self, request: &PickRequest) -> Result<String, AgentError> {
        request_pick(request, &self.model, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_oracle_carries_model_and_timeout() {
        let oracle =
            ClaudeCandidateOracle::new("claude-3-5-haiku-latest".to_string(), Duration::from_secs(20));
        assert_eq!(oracle.name(), "claude");
        assert_eq!(oracle.model, "claude-3-5-haiku-latest");
        assert_eq!(oracle.timeout, Duration::from_secs(20));
    }
}
