use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// Result of a single pass through a worker's attempt loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success { candidate: Candidate },
    /// The parsed ticker failed the validity check, or the check itself failed.
    InvalidIdentifier { identifier: String },
    DuplicateIdentifier { identifier: String },
    /// The oracle text did not start with a ticker. `raw` keeps the text.
    ParseFailure { raw: String },
    OracleError { message: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickAttempt {
    /// 1-based.
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
}

/// Why a worker stopped without a pick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Exceeded retry limit.
    RetryExhausted,
    /// The run deadline fired before the worker finished.
    Cancelled,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::RetryExhausted => write!(f, "exceeded retry limit"),
            FailureReason::Cancelled => write!(f, "cancelled by run deadline"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerOutcome {
    Picked { candidate: Candidate },
    Failed { reason: FailureReason },
}

/// Terminal value of one pick worker, with its full attempt history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub outcome: WorkerOutcome,
    pub attempts: Vec<PickAttempt>,
    pub elapsed_ms: u64,
}

impl WorkerResult {
    pub fn candidate(&self) -> Option<&Candidate> {
        match &self.outcome {
            WorkerOutcome::Picked { candidate } => Some(candidate),
            WorkerOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self.outcome {
            WorkerOutcome::Picked { .. } => None,
            WorkerOutcome::Failed { reason } => Some(reason),
        }
    }
}
