// src/adapters/memory.rs
use crate::{EquityError, EquityFilter, EquityKey, EquityStore, PageWindow, StoredEquity};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process store. Rows are kept in insertion order, so positions created
/// in the same millisecond still page out in the order they were written.
///
/// Each trait method takes the lock once, which gives the same per-statement
/// atomicity a relational engine gives `INSERT` and `UPDATE ... WHERE version = ?`.
/// Clones share the same rows.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    rows: Arc<Mutex<Vec<StoredEquity>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl EquityStore for MemoryAdapter {
    async fn find(&self, key: &EquityKey) -> Result<Option<StoredEquity>, EquityError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.key() == *key).cloned())
    }

    async fn try_insert(&self, row: &StoredEquity) -> Result<u64, EquityError> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|existing| existing.key() == row.key()) {
            return Ok(0);
        }
        rows.push(row.clone());
        Ok(1)
    }

    async fn try_advance(
        &self,
        key: &EquityKey,
        expected_version: i64,
        equity: &str,
    ) -> Result<u64, EquityError> {
        let mut rows = self.rows.lock().await;
        match rows
            .iter_mut()
            .find(|row| row.key() == *key && row.version == expected_version)
        {
            Some(row) => {
                row.equity = equity.to_string();
                row.version += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn fetch_page(
        &self,
        filter: &EquityFilter,
        window: PageWindow,
    ) -> Result<Vec<StoredEquity>, EquityError> {
        let rows = self.rows.lock().await;

        let mut matching: Vec<&StoredEquity> = rows.iter().filter(|row| filter.matches(row)).collect();
        // stable: ties keep insertion order
        matching.sort_by_key(|row| row.created_at);

        let offset = usize::try_from(window.offset())
            .map_err(|_| EquityError::InvalidArgument("start out of range"))?;
        let limit = usize::try_from(window.limit())
            .map_err(|_| EquityError::InvalidArgument("limit out of range"))?;

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &EquityFilter) -> Result<i64, EquityError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|row| filter.matches(row)).count() as i64)
    }
}
