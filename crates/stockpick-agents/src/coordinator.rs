use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use stockpick_models::{
    AgentReport, Candidate, DedupMode, Disposition, PickerConfig, RunResult, WorkerOutcome,
    WorkerResult,
};
use stockpick_validity::ValidityOracle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::oracle::CandidateOracle;
use crate::worker::{ChosenView, Claimant, PickWorker, WorkerSettings};

/// Messages from workers to the coordinator's drain loop.
pub(crate) enum WorkerMessage {
    /// Claim mode only: ask to be credited with a validated pick.
    Claim {
        worker_id: usize,
        candidate: Candidate,
        reply: oneshot::Sender<bool>,
    },
    Finished(WorkerResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accepted,
    Duplicate,
}

/// The chosen set and the accepted picks of one run. Only the drain loop touches it.
#[derive(Default)]
struct Ledger {
    /// Ticker to the worker it was credited to.
    chosen: HashMap<String, usize>,
    picks: Vec<Candidate>,
}

impl Ledger {
    fn accept(&mut self, worker_id: usize, candidate: &Candidate) -> Verdict {
        match self.chosen.get(&candidate.identifier) {
            Some(&owner) if owner == worker_id => Verdict::Accepted,
            Some(_) => Verdict::Duplicate,
            None => {
                self.chosen
                    .insert(candidate.identifier.clone(), worker_id);
                self.picks.push(candidate.clone());
                Verdict::Accepted
            }
        }
    }

    fn credited(&self, worker_id: usize) -> Option<&str> {
        self.chosen
            .iter()
            .find(|(_, owner)| **owner == worker_id)
            .map(|(ticker, _)| ticker.as_str())
    }

    fn snapshot(&self) -> Arc<BTreeSet<String>> {
        Arc::new(self.chosen.keys().cloned().collect())
    }
}

/// Fans out pick workers and collects a deduplicated set of picks.
pub struct AgentCoordinator {
    candidates: Arc<dyn CandidateOracle>,
    validity: Arc<dyn ValidityOracle>,
    config: PickerConfig,
    candidate_timeout: Duration,
    validity_timeout: Duration,
}

impl AgentCoordinator {
    pub fn new(
        candidates: Arc<dyn CandidateOracle>,
        validity: Arc<dyn ValidityOracle>,
        config: PickerConfig,
    ) -> Self {
        let defaults = WorkerSettings::default();
        Self {
            candidates,
            validity,
            config,
            candidate_timeout: defaults.candidate_timeout,
            validity_timeout: defaults.validity_timeout,
        }
    }

    pub fn with_timeouts(mut self, candidate: Duration, validity: Duration) -> Self {
        self.candidate_timeout = candidate;
        self.validity_timeout = validity;
        self
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            max_attempts: self.config.max_attempts_per_agent,
            candidate_timeout: self.candidate_timeout,
            validity_timeout: self.validity_timeout,
        }
    }

    /// Run every worker to a terminal state and return the accepted picks.
    ///
    /// Worker failures never fail the run; a short or empty result is valid.
    pub async fn run(&self) -> RunResult {
        let run_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let agent_count = self.config.agent_count;
        info!(
            run_id = %run_id,
            agents = agent_count,
            max_attempts = self.config.max_attempts_per_agent,
            mode = ?self.config.dedup_mode,
            "Starting pick run"
        );

        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<WorkerMessage>(agent_count.max(1));
        let mut ledger = Ledger::default();

        // 1. Fan out. Every worker is dispatched before any result is drained.
        let mut tasks = JoinSet::new();
        for worker_id in 1..=agent_count {
            let view = match self.config.dedup_mode {
                DedupMode::Snapshot => ChosenView::Snapshot(ledger.snapshot()),
                DedupMode::Claim => ChosenView::Claim(Claimant::new(worker_id, tx.clone())),
            };
            let worker = PickWorker::new(
                worker_id,
                Arc::clone(&self.candidates),
                Arc::clone(&self.validity),
                self.worker_settings(),
            )
            .with_run_id(run_id)
            .with_cancellation(cancel.child_token());
            let tx = tx.clone();

            tasks.spawn(async move {
                let result = worker.run(&view).await;
                drop(view);
                if tx.send(WorkerMessage::Finished(result)).await.is_err() {
                    warn!(worker = worker_id, "Coordinator gone before worker reported");
                }
            });
        }
        drop(tx);

        let deadline = self.config.run_deadline_seconds.map(|secs| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                warn!(deadline_secs = secs, "Run deadline reached, cancelling workers");
                cancel.cancel();
            })
        });

        // 2. Drain. This loop is the only writer of the ledger.
        let mut reports: BTreeMap<usize, AgentReport> = BTreeMap::new();
        while let Some(message) = rx.recv().await {
            match message {
                WorkerMessage::Claim {
                    worker_id,
                    candidate,
                    reply,
                } => {
                    let verdict = ledger.accept(worker_id, &candidate);
                    match verdict {
                        Verdict::Accepted => {
                            info!(worker = worker_id, ticker = %candidate.identifier, "Accepted pick")
                        }
                        Verdict::Duplicate => {
                            debug!(worker = worker_id, ticker = %candidate.identifier, "Claim rejected")
                        }
                    }
                    let _ = reply.send(verdict == Verdict::Accepted);
                }
                WorkerMessage::Finished(result) => {
                    let report = arbitrate(&mut ledger, result, self.config.dedup_mode);
                    reports.insert(report.worker_id, report);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Pick worker task panicked");
            }
        }
        if let Some(handle) = deadline {
            handle.abort();
        }

        for worker_id in 1..=agent_count {
            reports.entry(worker_id).or_insert_with(|| AgentReport {
                worker_id,
                disposition: Disposition::Lost,
                identifier: ledger.credited(worker_id).map(str::to_string),
                attempts: vec![],
                elapsed_ms: 0,
            });
        }

        let result = RunResult {
            run_id,
            started_at,
            requested_agents: agent_count,
            picks: ledger.picks,
            agents: reports.into_values().collect(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            run_id = %run_id,
            accepted = result.picks.len(),
            late_duplicates = result.count(Disposition::LateDuplicate),
            exhausted = result.count(Disposition::RetryExhausted),
            cancelled = result.count(Disposition::Cancelled),
            lost = result.count(Disposition::Lost),
            elapsed_ms = result.processing_time_ms,
            "Pick run complete"
        );

        result
    }
}

/// Decide what a finished worker contributes to the run.
fn arbitrate(ledger: &mut Ledger, result: WorkerResult, mode: DedupMode) -> AgentReport {
    let worker_id = result.worker_id;
    let (disposition, identifier) = match &result.outcome {
        WorkerOutcome::Picked { candidate } => match ledger.accept(worker_id, candidate) {
            Verdict::Accepted => {
                if mode == DedupMode::Snapshot {
                    info!(worker = worker_id, ticker = %candidate.identifier, "Accepted pick");
                }
                (Disposition::Accepted, Some(candidate.identifier.clone()))
            }
            Verdict::Duplicate => {
                warn!(worker = worker_id, ticker = %candidate.identifier, "Late duplicate discarded");
                (Disposition::LateDuplicate, Some(candidate.identifier.clone()))
            }
        },
        WorkerOutcome::Failed { reason } => match ledger.credited(worker_id) {
            // A claim accepted just before the deadline still counts.
            Some(ticker) => (Disposition::Accepted, Some(ticker.to_string())),
            None => {
                warn!(
                    worker = worker_id,
                    reason = %reason,
                    attempts = result.attempts.len(),
                    "Worker produced no pick"
                );
                (Disposition::from(*reason), None)
            }
        },
    };

    AgentReport {
        worker_id,
        disposition,
        identifier,
        attempts: result.attempts,
        elapsed_ms: result.elapsed_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{AcceptAll, ConstantOracle, UniqueTickerOracle};
    use stockpick_models::{FailureReason, PickAttempt};

    fn picked(worker_id: usize, ticker: &str) -> WorkerResult {
        WorkerResult {
            worker_id,
            outcome: WorkerOutcome::Picked {
                candidate: Candidate::new(ticker, "reason"),
            },
            attempts: vec![],
            elapsed_ms: 1,
        }
    }

    #[test]
    fn ledger_rejects_second_owner() {
        let mut ledger = Ledger::default();
        let c = Candidate::new("AAPL", "a");

        assert_eq!(ledger.accept(1, &c), Verdict::Accepted);
        assert_eq!(ledger.accept(1, &c), Verdict::Accepted);
        assert_eq!(ledger.accept(2, &c), Verdict::Duplicate);
        assert_eq!(ledger.picks.len(), 1);
        assert_eq!(ledger.credited(1), Some("AAPL"));
        assert_eq!(ledger.credited(2), None);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut ledger = Ledger::default();
        let before = ledger.snapshot();
        ledger.accept(1, &Candidate::new("MSFT", "m"));

        assert!(before.is_empty());
        assert!(ledger.snapshot().contains("MSFT"));
    }

    #[test]
    fn arbitrate_late_duplicate() {
        let mut ledger = Ledger::default();
        let first = arbitrate(&mut ledger, picked(2, "NVDA"), DedupMode::Snapshot);
        let second = arbitrate(&mut ledger, picked(1, "NVDA"), DedupMode::Snapshot);

        assert_eq!(first.disposition, Disposition::Accepted);
        assert_eq!(second.disposition, Disposition::LateDuplicate);
        assert_eq!(second.identifier.as_deref(), Some("NVDA"));
        assert_eq!(ledger.picks.len(), 1);
    }

    #[test]
    fn arbitrate_failure_keeps_history() {
        let mut ledger = Ledger::default();
        let result = WorkerResult {
            worker_id: 4,
            outcome: WorkerOutcome::Failed {
                reason: FailureReason::RetryExhausted,
            },
            attempts: vec![PickAttempt {
                attempt_number: 1,
                outcome: stockpick_models::AttemptOutcome::OracleError {
                    message: "boom".to_string(),
                },
            }],
            elapsed_ms: 3,
        };

        let report = arbitrate(&mut ledger, result, DedupMode::Snapshot);
        assert_eq!(report.disposition, Disposition::RetryExhausted);
        assert_eq!(report.attempts.len(), 1);
        assert!(report.identifier.is_none());
        assert!(ledger.picks.is_empty());
    }

    #[test]
    fn cancelled_after_accepted_claim_counts_as_accepted() {
        let mut ledger = Ledger::default();
        ledger.accept(3, &Candidate::new("AMD", "a"));
        let result = WorkerResult {
            worker_id: 3,
            outcome: WorkerOutcome::Failed {
                reason: FailureReason::Cancelled,
            },
            attempts: vec![],
            elapsed_ms: 0,
        };

        let report = arbitrate(&mut ledger, result, DedupMode::Claim);
        assert_eq!(report.disposition, Disposition::Accepted);
        assert_eq!(report.identifier.as_deref(), Some("AMD"));
    }

    #[tokio::test]
    async fn one_report_per_worker() {
        let coordinator = AgentCoordinator::new(
            Arc::new(UniqueTickerOracle::new()),
            Arc::new(AcceptAll),
            PickerConfig {
                agent_count: 4,
                ..PickerConfig::default()
            },
        );

        let result = coordinator.run().await;

        assert_eq!(result.requested_agents, 4);
        let ids: Vec<usize> = result.agents.iter().map(|a| a.worker_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(result.picks.len(), 4);
    }

    #[tokio::test]
    async fn zero_agents_is_an_empty_run() {
        let coordinator = AgentCoordinator::new(
            Arc::new(ConstantOracle::new("AAPL - x")),
            Arc::new(AcceptAll),
            PickerConfig {
                agent_count: 0,
                ..PickerConfig::default()
            },
        );

        let result = coordinator.run().await;
        assert!(result.picks.is_empty());
        assert!(result.agents.is_empty());
    }
}
