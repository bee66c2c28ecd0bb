use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};

use crate::{
    Address, AssetEquity, EquityError, EquityFilter, EquityKey, EquityStore, Hash, Page,
    PageWindow, StoredEquity, codec,
    validation::{ensure_asset_code, ensure_asset_id, ensure_owner},
};

/// Access object for equity positions.
///
/// Holds no state besides the store handle, so one instance can be shared
/// across tasks. Writes are guarded by the version stamp only: a `set` that
/// loses a race fails with [`EquityError::Conflict`] and is never retried here.
#[derive(Clone)]
pub struct EquityDao {
    store: Arc<dyn EquityStore>,
}

impl EquityDao {
    pub fn new(store: Arc<dyn EquityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn EquityStore {
        self.store.as_ref()
    }

    /// Creates the position on first write, otherwise replaces its balance
    /// if nobody else advanced the version since it was read.
    pub async fn set(&self, owner: &Address, equity: &AssetEquity) -> Result<(), EquityError> {
        ensure_owner(owner)?;
        ensure_asset_id(&equity.asset_id)?;

        let result = match self.current_version(owner, &equity.asset_id).await {
            Ok(None) => self.insert(owner, equity).await.map(|_| "inserted"),
            Ok(Some((_, version))) => self.update(owner, equity, version).await.map(|_| "updated"),
            Err(err) => Err(err),
        };

        let outcome = match &result {
            Ok(outcome) => *outcome,
            Err(err) if err.is_conflict() => "conflict",
            Err(_) => "failed",
        };
        counter!("equity.set.total", "outcome" => outcome).increment(1);

        result.map(|_| ())
    }

    pub async fn get(&self, owner: &Address, asset_id: &Hash) -> Result<AssetEquity, EquityError> {
        ensure_owner(owner)?;
        ensure_asset_id(asset_id)?;

        match self.current_version(owner, asset_id).await? {
            Some((equity, _)) => Ok(equity),
            None => {
                tracing::debug!(%owner, %asset_id, "equity not found");
                Err(EquityError::NotFound)
            }
        }
    }

    /// Positions held by `owner`, oldest first.
    pub async fn get_page(
        &self,
        owner: &Address,
        start: i64,
        limit: i64,
    ) -> Result<Vec<AssetEquity>, EquityError> {
        ensure_owner(owner)?;
        let window = PageWindow::new(start, limit)?;
        self.page(EquityFilter::Owner(*owner), window).await
    }

    pub async fn get_page_with_total(
        &self,
        owner: &Address,
        start: i64,
        limit: i64,
    ) -> Result<Page, EquityError> {
        ensure_owner(owner)?;
        let window = PageWindow::new(start, limit)?;
        self.page_with_total(EquityFilter::Owner(*owner), window)
            .await
    }

    /// Positions of asset class `code` across all owners, oldest first.
    pub async fn get_page_by_code(
        &self,
        code: &Hash,
        start: i64,
        limit: i64,
    ) -> Result<Vec<AssetEquity>, EquityError> {
        ensure_asset_code(code)?;
        let window = PageWindow::new(start, limit)?;
        self.page(EquityFilter::Code(*code), window).await
    }

    pub async fn get_page_by_code_with_total(
        &self,
        code: &Hash,
        start: i64,
        limit: i64,
    ) -> Result<Page, EquityError> {
        ensure_asset_code(code)?;
        let window = PageWindow::new(start, limit)?;
        self.page_with_total(EquityFilter::Code(*code), window)
            .await
    }

    /// Positions of asset class `code` held by `owner`, oldest first.
    pub async fn get_page_by_owner_and_code(
        &self,
        owner: &Address,
        code: &Hash,
        start: i64,
        limit: i64,
    ) -> Result<Vec<AssetEquity>, EquityError> {
        ensure_owner(owner)?;
        ensure_asset_code(code)?;
        let window = PageWindow::new(start, limit)?;
        self.page(EquityFilter::OwnerAndCode(*owner, *code), window)
            .await
    }

    pub async fn get_page_by_owner_and_code_with_total(
        &self,
        owner: &Address,
        code: &Hash,
        start: i64,
        limit: i64,
    ) -> Result<Page, EquityError> {
        ensure_owner(owner)?;
        ensure_asset_code(code)?;
        let window = PageWindow::new(start, limit)?;
        self.page_with_total(EquityFilter::OwnerAndCode(*owner, *code), window)
            .await
    }

    /// Current position and its version stamp. A missing row is `Ok(None)`.
    pub(crate) async fn current_version(
        &self,
        owner: &Address,
        asset_id: &Hash,
    ) -> Result<Option<(AssetEquity, i64)>, EquityError> {
        let key = EquityKey {
            owner: *owner,
            asset_id: *asset_id,
        };
        match self.store.find(&key).await? {
            Some(row) => Ok(Some((row.to_asset_equity()?, row.version))),
            None => Ok(None),
        }
    }

    async fn insert(&self, owner: &Address, equity: &AssetEquity) -> Result<(), EquityError> {
        let row = StoredEquity {
            owner: *owner,
            asset_code: equity.asset_code,
            asset_id: equity.asset_id,
            equity: codec::encode(&equity.equity),
            created_at: Utc::now().timestamp_millis(),
            version: 1,
        };

        let affected = self.store.try_insert(&row).await?;
        if affected != 1 {
            tracing::warn!(%owner, asset_id = %equity.asset_id, affected, "insert equity affected unexpected rows");
            return Err(EquityError::Conflict {
                operation: "insert",
                affected,
            });
        }

        tracing::debug!(%owner, asset_id = %equity.asset_id, "equity inserted");
        Ok(())
    }

    async fn update(
        &self,
        owner: &Address,
        equity: &AssetEquity,
        version: i64,
    ) -> Result<(), EquityError> {
        let key = EquityKey {
            owner: *owner,
            asset_id: equity.asset_id,
        };

        let affected = self
            .store
            .try_advance(&key, version, &codec::encode(&equity.equity))
            .await?;
        if affected != 1 {
            tracing::warn!(%owner, asset_id = %equity.asset_id, version, affected, "update equity affected unexpected rows");
            return Err(EquityError::Conflict {
                operation: "update",
                affected,
            });
        }

        tracing::debug!(%owner, asset_id = %equity.asset_id, version = version + 1, "equity updated");
        Ok(())
    }

    async fn page(
        &self,
        filter: EquityFilter,
        window: PageWindow,
    ) -> Result<Vec<AssetEquity>, EquityError> {
        let start = Instant::now();
        let rows = self.store.fetch_page(&filter, window).await;
        histogram!("equity.page.duration_ms", "filter" => filter.kind())
            .record(start.elapsed().as_millis() as f64);

        rows?.iter().map(StoredEquity::to_asset_equity).collect()
    }

    // Count first, then page. The two reads are not one snapshot.
    async fn page_with_total(
        &self,
        filter: EquityFilter,
        window: PageWindow,
    ) -> Result<Page, EquityError> {
        let total = self.store.count(&filter).await?;
        let items = self.page(filter, window).await?;
        Ok(Page { items, total })
    }
}
