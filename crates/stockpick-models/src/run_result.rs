use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attempt::{FailureReason, PickAttempt};
use crate::candidate::Candidate;

/// What the coordinator did with one worker's terminal result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Accepted,
    /// The worker reported a pick another worker had already been credited with.
    LateDuplicate,
    RetryExhausted,
    Cancelled,
    /// The worker task died without reporting.
    Lost,
}

impl From<FailureReason> for Disposition {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::RetryExhausted => Disposition::RetryExhausted,
            FailureReason::Cancelled => Disposition::Cancelled,
        }
    }
}

/// Per-worker diagnostics attached to a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentReport {
    pub worker_id: usize,
    pub disposition: Disposition,
    /// The ticker the worker ended on, if it produced one.
    pub identifier: Option<String>,
    pub attempts: Vec<PickAttempt>,
    pub elapsed_ms: u64,
}

/// Output of one coordinator run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub requested_agents: usize,
    /// Accepted picks in acceptance order. No two share an identifier.
    pub picks: Vec<Candidate>,
    /// One report per worker, ordered by worker id.
    pub agents: Vec<AgentReport>,
    pub processing_time_ms: u64,
}

impl RunResult {
    pub fn identifiers(&self) -> Vec<&str> {
        self.picks.iter().map(|c| c.identifier.as_str()).collect()
    }

    pub fn count(&self, disposition: Disposition) -> usize {
        self.agents
            .iter()
            .filter(|a| a.disposition == disposition)
            .count()
    }

    pub fn is_short(&self) -> bool {
        self.picks.len() < self.requested_agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::AttemptOutcome;

    fn sample() -> RunResult {
        RunResult {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            requested_agents: 3,
            picks: vec![
                Candidate::new("PLTR", "Army contract announced"),
                Candidate::new("SMCI", "Index inclusion"),
            ],
            agents: vec![
                AgentReport {
                    worker_id: 1,
                    disposition: Disposition::Accepted,
                    identifier: Some("PLTR".to_string()),
                    attempts: vec![],
                    elapsed_ms: 20,
                },
                AgentReport {
                    worker_id: 2,
                    disposition: Disposition::Accepted,
                    identifier: Some("SMCI".to_string()),
                    attempts: vec![],
                    elapsed_ms: 25,
                },
                AgentReport {
                    worker_id: 3,
                    disposition: Disposition::RetryExhausted,
                    identifier: None,
                    attempts: vec![PickAttempt {
                        attempt_number: 1,
                        outcome: AttemptOutcome::ParseFailure {
                            raw: "no idea".to_string(),
                        },
                    }],
                    elapsed_ms: 40,
                },
            ],
            processing_time_ms: 41,
        }
    }

    #[test]
    fn counts_dispositions() {
        let run = sample();
        assert_eq!(run.identifiers(), vec!["PLTR", "SMCI"]);
        assert_eq!(run.count(Disposition::Accepted), 2);
        assert_eq!(run.count(Disposition::RetryExhausted), 1);
        assert_eq!(run.count(Disposition::LateDuplicate), 0);
        assert!(run.is_short());
    }

    #[test]
    fn roundtrip_run_result() {
        let run = sample();
        let json = serde_json::to_string(&run).unwrap();
        let parsed: RunResult = serde_json::from_str(&json).unwrap();
        assert_eq!(run, parsed);
        assert!(json.contains("\"retry_exhausted\""));
    }

    #[test]
    fn failure_reason_maps_to_disposition() {
        assert_eq!(
            Disposition::from(FailureReason::Cancelled),
            Disposition::Cancelled
        );
        assert_eq!(
            Disposition::from(FailureReason::RetryExhausted),
            Disposition::RetryExhausted
        );
    }
}
