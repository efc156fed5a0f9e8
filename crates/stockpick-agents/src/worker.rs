use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use stockpick_models::{
    AttemptOutcome, Candidate, FailureReason, PickAttempt, PickRequest, WorkerOutcome,
    WorkerResult,
};
use stockpick_validity::ValidityOracle;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coordinator::WorkerMessage;
use crate::oracle::CandidateOracle;
use crate::parser::parse_pick_response;

/// Attempt bound and per-oracle call timeouts for one worker.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub max_attempts: u32,
    pub candidate_timeout: Duration,
    pub validity_timeout: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            candidate_timeout: Duration::from_secs(45),
            validity_timeout: Duration::from_secs(10),
        }
    }
}

/// What a worker knows about tickers chosen by the rest of the run.
pub enum ChosenView {
    /// Read-only copy of the chosen set taken at dispatch.
    Snapshot(Arc<BTreeSet<String>>),
    /// Validated picks are claimed through the coordinator before the worker stops.
    Claim(Claimant),
}

impl ChosenView {
    pub fn snapshot<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChosenView::Snapshot(Arc::new(tickers.into_iter().map(Into::into).collect()))
    }

    fn known(&self) -> BTreeSet<String> {
        match self {
            ChosenView::Snapshot(set) => set.as_ref().clone(),
            ChosenView::Claim(_) => BTreeSet::new(),
        }
    }
}

/// A worker's line to the coordinator's claim arbitration.
pub struct Claimant {
    worker_id: usize,
    tx: mpsc::Sender<WorkerMessage>,
}

impl Claimant {
    pub(crate) fn new(worker_id: usize, tx: mpsc::Sender<WorkerMessage>) -> Self {
        Self { worker_id, tx }
    }

    /// Ask the coordinator to credit `candidate` to this worker.
    /// A coordinator that has gone away counts as a rejection.
    async fn claim(&self, candidate: &Candidate) -> bool {
        let (reply, verdict) = oneshot::channel();
        let message = WorkerMessage::Claim {
            worker_id: self.worker_id,
            candidate: candidate.clone(),
            reply,
        };
        if self.tx.send(message).await.is_err() {
            return false;
        }
        verdict.await.unwrap_or(false)
    }
}

/// Runs one agent's attempt loop until it has a pick or runs out of attempts.
pub struct PickWorker {
    worker_id: usize,
    run_id: Uuid,
    candidates: Arc<dyn CandidateOracle>,
    validity: Arc<dyn ValidityOracle>,
    settings: WorkerSettings,
    cancel: CancellationToken,
}

impl PickWorker {
    pub fn new(
        worker_id: usize,
        candidates: Arc<dyn CandidateOracle>,
        validity: Arc<dyn ValidityOracle>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            worker_id,
            run_id: Uuid::nil(),
            candidates,
            validity,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Run the attempt loop. Always returns a terminal result.
    pub async fn run(&self, view: &ChosenView) -> WorkerResult {
        let start = Instant::now();
        let mut attempts: Vec<PickAttempt> = Vec::new();
        let mut excluded = view.known();

        for attempt_number in 1..=self.settings.max_attempts {
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(worker = self.worker_id, attempt = attempt_number, "Worker cancelled");
                    return self.finish(WorkerOutcome::Failed { reason: FailureReason::Cancelled }, attempts, start);
                }
                outcome = self.attempt(attempt_number, view, &excluded) => outcome,
            };

            let picked = match &outcome {
                AttemptOutcome::Success { candidate } => {
                    debug!(worker = self.worker_id, attempt = attempt_number, ticker = %candidate.identifier, "Worker found pick");
                    Some(candidate.clone())
                }
                AttemptOutcome::DuplicateIdentifier { identifier } => {
                    warn!(worker = self.worker_id, attempt = attempt_number, ticker = %identifier, "Duplicate ticker");
                    excluded.insert(identifier.clone());
                    None
                }
                AttemptOutcome::InvalidIdentifier { identifier } => {
                    warn!(worker = self.worker_id, attempt = attempt_number, ticker = %identifier, "Invalid ticker");
                    None
                }
                AttemptOutcome::ParseFailure { raw } => {
                    warn!(worker = self.worker_id, attempt = attempt_number, len = raw.len(), "Unparsable pick response");
                    None
                }
                AttemptOutcome::OracleError { message } => {
                    warn!(worker = self.worker_id, attempt = attempt_number, error = %message, "Candidate oracle error");
                    None
                }
            };

            attempts.push(PickAttempt {
                attempt_number,
                outcome,
            });

            if let Some(candidate) = picked {
                return self.finish(WorkerOutcome::Picked { candidate }, attempts, start);
            }
        }

        warn!(
            worker = self.worker_id,
            attempts = attempts.len(),
            "Exceeded retry limit"
        );
        self.finish(
            WorkerOutcome::Failed {
                reason: FailureReason::RetryExhausted,
            },
            attempts,
            start,
        )
    }

    async fn attempt(
        &self,
        attempt_number: u32,
        view: &ChosenView,
        excluded: &BTreeSet<String>,
    ) -> AttemptOutcome {
        let request = PickRequest {
            run_id: self.run_id,
            worker_id: self.worker_id,
            attempt: attempt_number,
            excluded: excluded.iter().cloned().collect(),
        };

        // 1. Ask for a pick
        let raw = match tokio::time::timeout(
            self.settings.candidate_timeout,
            self.candidates.propose(&request),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                return AttemptOutcome::OracleError {
                    message: e.to_string(),
                }
            }
            Err(_) => {
                return AttemptOutcome::OracleError {
                    message: format!(
                        "{} timed out after {:?}",
                        self.candidates.name(),
                        self.settings.candidate_timeout
                    ),
                }
            }
        };

        // 2. Parse
        let Some(candidate) = parse_pick_response(&raw).into_candidate() else {
            return AttemptOutcome::ParseFailure {
                raw: raw.trim().to_string(),
            };
        };

        // 3. Validate. An unverifiable ticker is treated as invalid.
        let identifier = candidate.identifier.clone();
        match tokio::time::timeout(
            self.settings.validity_timeout,
            self.validity.is_valid(&identifier),
        )
        .await
        {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return AttemptOutcome::InvalidIdentifier { identifier },
            Ok(Err(e)) => {
                debug!(worker = self.worker_id, ticker = %identifier, error = %e, "Validity check failed");
                return AttemptOutcome::InvalidIdentifier { identifier };
            }
            Err(_) => {
                debug!(worker = self.worker_id, ticker = %identifier, "Validity check timed out");
                return AttemptOutcome::InvalidIdentifier { identifier };
            }
        }

        // 4. Duplicate check against what this worker knows
        if excluded.contains(&identifier) {
            return AttemptOutcome::DuplicateIdentifier { identifier };
        }

        // 5. Claim mode defers the final word to the coordinator
        if let ChosenView::Claim(claimant) = view {
            if !claimant.claim(&candidate).await {
                return AttemptOutcome::DuplicateIdentifier { identifier };
            }
        }

        AttemptOutcome::Success { candidate }
    }

    fn finish(
        &self,
        outcome: WorkerOutcome,
        attempts: Vec<PickAttempt>,
        start: Instant,
    ) -> WorkerResult {
        WorkerResult {
            worker_id: self.worker_id,
            outcome,
            attempts,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }
}
