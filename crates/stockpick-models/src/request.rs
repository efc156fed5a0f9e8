use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context handed to a candidate oracle for one attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickRequest {
    pub run_id: Uuid,
    pub worker_id: usize,
    pub attempt: u32,
    /// Tickers the worker already knows are taken, sorted.
    pub excluded: Vec<String>,
}
