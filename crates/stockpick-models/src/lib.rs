pub mod attempt;
pub mod candidate;
pub mod config;
pub mod request;
pub mod run_result;

pub use attempt::{AttemptOutcome, FailureReason, PickAttempt, WorkerOutcome, WorkerResult};
pub use candidate::{is_identifier, Candidate, UNKNOWN_IDENTIFIER};
pub use config::{
    CandidateOracleConfig, DedupMode, PickerConfig, StockpickConfig, ValidityConfig,
    ValidityProvider,
};
pub use request::PickRequest;
pub use run_result::{AgentReport, Disposition, RunResult};
