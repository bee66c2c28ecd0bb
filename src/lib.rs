// src/lib.rs
pub mod adapters;
pub mod codec;
pub mod config;
pub mod dao;
pub mod equity;
pub mod error;
pub mod identity;
pub mod validation;

pub use config::PoolConfig;
pub use dao::EquityDao;
pub use equity::{AssetEquity, EquityFilter, EquityKey, Page, StoredEquity};
pub use error::EquityError;
pub use identity::{Address, Hash, ParseIdentifierError};
pub use num_bigint::BigUint;
pub use validation::PageWindow;

use async_trait::async_trait;

/// Backing store for equity positions.
///
/// Every method is a single statement against the store. Implementors MUST
/// apply `try_insert` and `try_advance` atomically and report the number of
/// rows they changed; the DAO turns anything other than one into a conflict.
#[async_trait]
pub trait EquityStore: Send + Sync {
    /// Point read by natural key.
    async fn find(&self, key: &EquityKey) -> Result<Option<StoredEquity>, EquityError>;

    /// Inserts a new row unless one already exists for its key.
    /// Returns the number of rows inserted.
    async fn try_insert(&self, row: &StoredEquity) -> Result<u64, EquityError>;

    /// Compare-and-swap on the version stamp: sets `equity` and bumps
    /// `version` by one only if the stored version still equals
    /// `expected_version`. Returns the number of rows updated.
    async fn try_advance(
        &self,
        key: &EquityKey,
        expected_version: i64,
        equity: &str,
    ) -> Result<u64, EquityError>;

    /// Rows matching `filter`, oldest `created_at` first.
    async fn fetch_page(
        &self,
        filter: &EquityFilter,
        window: PageWindow,
    ) -> Result<Vec<StoredEquity>, EquityError>;

    async fn count(&self, filter: &EquityFilter) -> Result<i64, EquityError>;
}
