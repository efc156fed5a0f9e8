pub mod claude_cli;
pub mod coordinator;
pub mod error;
pub mod oracle;
pub mod parser;
pub mod prompts;
pub mod worker;

pub mod test_support;

pub use coordinator::AgentCoordinator;
pub use error::AgentError;
pub use oracle::{CandidateOracle, ClaudeCandidateOracle};
pub use parser::{parse_pick_response, ParsedResponse};
pub use worker::{ChosenView, PickWorker, WorkerSettings};
