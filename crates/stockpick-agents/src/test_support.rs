//! Deterministic oracle stubs for exercising workers and the coordinator
//! without the Claude CLI or network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stockpick_models::PickRequest;
use stockpick_validity::{ValidityError, ValidityOracle};

use crate::error::AgentError;
use crate::oracle::CandidateOracle;

pub use stockpick_validity::AllowList;

/// Bijective base-26 ticker for `n`: 0 is "A", 25 is "Z", 26 is "AA".
pub fn ticker_for(mut n: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Returns the same text on every call.
pub struct ConstantOracle {
    text: String,
    calls: Arc<AtomicUsize>,
}

impl ConstantOracle {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CandidateOracle for ConstantOracle {
    fn name(&self) -> &str {
        "constant"
    }

    async fn propose(&self, _request: &PickRequest) -> Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Always fails, as a rate-limited or unreachable oracle would.
pub struct FailingOracle {
    message: String,
}

impl FailingOracle {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl CandidateOracle for FailingOracle {
    fn name(&self) -> &str {
        "failing"
    }

    async fn propose(&self, _request: &PickRequest) -> Result<String, AgentError> {
        Err(AgentError::Unavailable(self.message.clone()))
    }
}

/// Plays back a fixed script shared by every caller, then fails once empty.
/// `Err` entries become oracle errors.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedOracle {
    pub fn new<'a>(script: impl IntoIterator<Item = Result<&'a str, &'a str>>) -> Self {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl CandidateOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn propose(&self, _request: &PickRequest) -> Result<String, AgentError> {
        let next = self
            .script
            .lock()
            .map_err(|e| AgentError::Unavailable(format!("script mutex poisoned: {e}")))?
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AgentError::Unavailable(message)),
            None => Err(AgentError::Unavailable("script exhausted".to_string())),
        }
    }
}

/// Returns a ticker no earlier call has returned.
pub struct UniqueTickerOracle {
    next: AtomicUsize,
}

impl UniqueTickerOracle {
    pub fn new() -> Self {
        Self {
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for UniqueTickerOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandidateOracle for UniqueTickerOracle {
    fn name(&self) -> &str {
        "unique"
    }

    async fn propose(&self, _request: &PickRequest) -> Result<String, AgentError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} - Catalyst number {n}", ticker_for(n)))
    }
}

type ResponseFn = dyn Fn(&PickRequest) -> Result<String, AgentError> + Send + Sync;

/// Answers from a function of the request, e.g. keyed by worker and attempt.
pub struct FnOracle {
    respond: Box<ResponseFn>,
}

impl FnOracle {
    pub fn new(
        respond: impl Fn(&PickRequest) -> Result<String, AgentError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
        }
    }
}

#[async_trait]
impl CandidateOracle for FnOracle {
    fn name(&self) -> &str {
        "fn"
    }

    async fn propose(&self, request: &PickRequest) -> Result<String, AgentError> {
        (self.respond)(request)
    }
}

/// Sleeps before answering.
pub struct SlowOracle {
    text: String,
    delay: Duration,
}

impl SlowOracle {
    pub fn new(text: &str, delay: Duration) -> Self {
        Self {
            text: text.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl CandidateOracle for SlowOracle {
    fn name(&self) -> &str {
        "slow"
    }

    async fn propose(&self, _request: &PickRequest) -> Result<String, AgentError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.text.clone())
    }
}

/// Every ticker is valid.
pub struct AcceptAll;

#[async_trait]
impl ValidityOracle for AcceptAll {
    async fn is_valid(&self, _identifier: &str) -> Result<bool, ValidityError> {
        Ok(true)
    }
}

/// No ticker is valid.
pub struct RejectAll;

#[async_trait]
impl ValidityOracle for RejectAll {
    async fn is_valid(&self, _identifier: &str) -> Result<bool, ValidityError> {
        Ok(false)
    }
}

/// The lookup itself always fails.
pub struct FailingValidity;

#[async_trait]
impl ValidityOracle for FailingValidity {
    async fn is_valid(&self, _identifier: &str) -> Result<bool, ValidityError> {
        Err(ValidityError::Unavailable("validity stub down".to_string()))
    }
}

/// Wraps another validity oracle and counts lookups.
pub struct CountingValidity<V> {
    inner: V,
    calls: Arc<AtomicUsize>,
}

impl<V: ValidityOracle> CountingValidity<V> {
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl<V: ValidityOracle> ValidityOracle for CountingValidity<V> {
    async fn is_valid(&self, identifier: &str) -> Result<bool, ValidityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.is_valid(identifier).await
    }
}
