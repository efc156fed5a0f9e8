//! stockpick - concurrent, deduplicating ticker picks from independent agents.
//!
//! A fixed number of pick workers ask a candidate oracle (the Claude CLI) for
//! one ticker each, validate it against a validity oracle (Yahoo Finance or an
//! allow-list), and retry under a bounded policy. The coordinator keeps the
//! final picks free of duplicates.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use stockpick::models::StockpickConfig;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = StockpickConfig::default();
//! let coordinator = stockpick::build_coordinator(&config)?;
//! let result = coordinator.run().await;
//! println!("{:?}", result.identifiers());
//! # Ok(())
//! # }
//! ```

pub use stockpick_agents as agents;
pub use stockpick_models as models;
pub use stockpick_validity as validity;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context};
use stockpick_agents::{AgentCoordinator, CandidateOracle, ClaudeCandidateOracle};
use stockpick_models::config::{StockpickConfig, ValidityConfig, ValidityProvider};
use stockpick_validity::{AllowList, CachedValidity, ValidityOracle, YahooValidity};

/// Read a TOML config file. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<StockpickConfig, anyhow::Error> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        return Ok(StockpickConfig::default());
    }

    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&config_str).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Reject configurations no run can start with.
pub fn validate_config(config: &StockpickConfig) -> Result<(), anyhow::Error> {
    ensure!(config.picker.agent_count > 0, "agent_count must be positive");
    ensure!(
        config.picker.max_attempts_per_agent > 0,
        "max_attempts_per_agent must be positive"
    );
    ensure!(
        config.picker.run_deadline_seconds != Some(0),
        "run_deadline_seconds must be positive when set"
    );
    if config.validity.provider == ValidityProvider::AllowList {
        ensure!(
            !config.validity.allow_list.is_empty(),
            "validity.allow_list is empty but provider is allow_list"
        );
    }
    Ok(())
}

/// Build the validity oracle, memoized through moka.
pub fn build_validity(config: &ValidityConfig) -> Result<Arc<dyn ValidityOracle>, anyhow::Error> {
    let ttl = Duration::from_secs(config.cache_ttl_seconds);
    let oracle: Arc<dyn ValidityOracle> = match config.provider {
        ValidityProvider::Yahoo => {
            let yahoo = YahooValidity::new(Duration::from_secs(config.timeout_seconds))
                .context("Failed to build Yahoo HTTP client")?;
            Arc::new(CachedValidity::new(yahoo, config.cache_max_capacity, ttl))
        }
        ValidityProvider::AllowList => Arc::new(CachedValidity::new(
            AllowList::new(&config.allow_list),
            config.cache_max_capacity,
            ttl,
        )),
    };
    Ok(oracle)
}

/// Build a coordinator from configuration.
pub fn build_coordinator(config: &StockpickConfig) -> Result<AgentCoordinator, anyhow::Error> {
    validate_config(config)?;

    let candidate_timeout = Duration::from_secs(config.candidate_oracle.timeout_seconds);
    let candidates: Arc<dyn CandidateOracle> = Arc::new(ClaudeCandidateOracle::new(
        config.candidate_oracle.model.clone(),
        candidate_timeout,
    ));
    let validity = build_validity(&config.validity)?;

    Ok(
        AgentCoordinator::new(candidates, validity, config.picker.clone()).with_timeouts(
            candidate_timeout,
            Duration::from_secs(config.validity.timeout_seconds),
        ),
    )
}
