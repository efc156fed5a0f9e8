use serde::{Deserialize, Serialize};

/// Identifier reported when a response does not start with a ticker.
pub const UNKNOWN_IDENTIFIER: &str = "UNKNOWN";

/// A ticker pick extracted from a candidate oracle response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// 1 to 5 uppercase ASCII letters, e.g. "AAPL".
    pub identifier: String,
    /// Short catalyst the oracle gave for the pick.
    pub rationale: String,
}

impl Candidate {
    pub fn new(identifier: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            rationale: rationale.into(),
        }
    }
}

/// True for 1 to 5 uppercase ASCII letters.
pub fn is_identifier(s: &str) -> bool {
    (1..=5).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_uppercase())
}
