pub mod allow_list;
pub mod cached;
pub mod error;
pub mod memory;
pub mod yahoo;

use async_trait::async_trait;

pub use allow_list::AllowList;
pub use cached::CachedValidity;
pub use error::ValidityError;
pub use yahoo::YahooValidity;

/// Answers whether a ticker names a recognized tradable symbol.
///
/// Implementations do not retry; callers decide what a failure means.
#[async_trait]
pub trait ValidityOracle: Send + Sync {
    async fn is_valid(&self, identifier: &str) -> Result<bool, ValidityError>;
}
