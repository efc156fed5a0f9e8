use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::ValidityError;
use crate::ValidityOracle;

/// Offline validity oracle: a ticker is valid when it is on a fixed list.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    tickers: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tickers: tickers
                .into_iter()
                .map(|t| t.as_ref().trim().to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

#[async_trait]
impl ValidityOracle for AllowList {
    async fn is_valid(&self, identifier: &str) -> Result<bool, ValidityError> {
        Ok(self.tickers.contains(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn normalizes_configured_tickers() {
        let list = AllowList::new([" aapl", "MSFT "]);
        assert_eq!(list.len(), 2);
        assert!(list.is_valid("AAPL").await.unwrap());
        assert!(list.is_valid("MSFT").await.unwrap());
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let list = AllowList::new(["NVDA"]);
        assert!(!list.is_valid("nvda").await.unwrap());
        assert!(!list.is_valid("AMD").await.unwrap());
    }
}
