use serde::{Deserialize, Serialize};

/// Top-level configuration for stockpick.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StockpickConfig {
    #[serde(default)]
    pub picker: PickerConfig,
    #[serde(default)]
    pub candidate_oracle: CandidateOracleConfig,
    #[serde(default)]
    pub validity: ValidityConfig,
}

/// How workers learn which tickers are already taken.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Each worker checks against a copy of the chosen set taken at dispatch.
    /// Collisions the copy missed are dropped by the coordinator as late duplicates.
    #[default]
    Snapshot,
    /// Each worker asks the coordinator to claim a validated ticker and retries
    /// when the claim is rejected.
    Claim,
}

/// Configuration for the coordinator and its workers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickerConfig {
    /// Number of workers dispatched per run. Also the parallelism bound.
    #[serde(default = "default_agent_count")]
    pub agent_count: usize,
    /// Attempt bound per worker.
    #[serde(default = "default_max_attempts")]
    pub max_attempts_per_agent: u32,
    #[serde(default)]
    pub dedup_mode: DedupMode,
    /// Cancel unfinished workers after this many seconds. No deadline when unset.
    #[serde(default)]
    pub run_deadline_seconds: Option<u64>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            agent_count: default_agent_count(),
            max_attempts_per_agent: default_max_attempts(),
            dedup_mode: DedupMode::default(),
            run_deadline_seconds: None,
        }
    }
}

/// Configuration for the Claude CLI candidate oracle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateOracleConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_candidate_timeout")]
    pub timeout_seconds: u64,
}

impl Default for CandidateOracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_seconds: default_candidate_timeout(),
        }
    }
}

/// Which validity oracle backs ticker checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidityProvider {
    #[default]
    Yahoo,
    AllowList,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidityConfig {
    #[serde(default)]
    pub provider: ValidityProvider,
    #[serde(default = "default_validity_timeout")]
    pub timeout_seconds: u64,
    /// Tickers accepted by the `allow_list` provider.
    #[serde(default)]
    pub allow_list: Vec<String>,
    /// Maximum number of memoized validity answers.
    #[serde(default = "default_cache_capacity")]
    pub cache_max_capacity: u64,
    /// How long a memoized answer is trusted.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            provider: ValidityProvider::default(),
            timeout_seconds: default_validity_timeout(),
            allow_list: Vec::new(),
            cache_max_capacity: default_cache_capacity(),
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

fn default_agent_count() -> usize {
    10
}
fn default_max_attempts() -> u32 {
    5
}
fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}
fn default_candidate_timeout() -> u64 {
    45
}
fn default_validity_timeout() -> u64 {
    10
}
fn default_cache_capacity() -> u64 {
    10_000
}
fn default_cache_ttl() -> u64 {
    3600
}
