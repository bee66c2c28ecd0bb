use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::{
    EquityError, EquityFilter, EquityKey, EquityStore, PageWindow, PoolConfig, StoredEquity,
    adapters::{EQUITY_COLUMNS, filter_clause, stored_from_row},
};

/// SQLite adapter over the `t_equity` table.
///
/// Same layout as the Postgres schema. Ties on `utc_st` page out in rowid
/// (insertion) order.
pub struct SqliteAdapter {
    pub(crate) pool: SqlitePool,
}

fn placeholder(_: usize) -> String {
    "?".to_string()
}

impl SqliteAdapter {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &PoolConfig) -> Result<Self, EquityError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new SQLite adapter with an in-memory database
    pub async fn new_memory() -> Result<Self, EquityError> {
        // every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<(), EquityError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS t_equity (
                addr TEXT NOT NULL,
                id TEXT NOT NULL,
                code TEXT NOT NULL,
                equity TEXT NOT NULL,
                utc_st INTEGER NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (addr, id)
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_equity_addr_utc_st ON t_equity(addr, utc_st)")
            .execute(&mut *tx)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_equity_code_utc_st ON t_equity(code, utc_st)")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl EquityStore for SqliteAdapter {
    async fn find(&self, key: &EquityKey) -> Result<Option<StoredEquity>, EquityError> {
        let sql = format!("SELECT {EQUITY_COLUMNS} FROM t_equity WHERE id = ? AND addr = ?");
        let row = sqlx::query(&sql)
            .bind(key.asset_id.to_string())
            .bind(key.owner.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(stored_from_row).transpose()?)
    }

    async fn try_insert(&self, row: &StoredEquity) -> Result<u64, EquityError> {
        let result = sqlx::query(
            r#"
            INSERT INTO t_equity (code, id, addr, equity, utc_st, version)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (addr, id) DO NOTHING
            "#,
        )
        .bind(row.asset_code.to_string())
        .bind(row.asset_id.to_string())
        .bind(row.owner.to_string())
        .bind(row.equity.clone())
        .bind(row.created_at)
        .bind(row.version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn try_advance(
        &self,
        key: &EquityKey,
        expected_version: i64,
        equity: &str,
    ) -> Result<u64, EquityError> {
        let result = sqlx::query(
            r#"
            UPDATE t_equity
            SET equity = ?, version = version + 1
            WHERE id = ? AND version = ? AND addr = ?
            "#,
        )
        .bind(equity.to_string())
        .bind(key.asset_id.to_string())
        .bind(expected_version)
        .bind(key.owner.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn fetch_page(
        &self,
        filter: &EquityFilter,
        window: PageWindow,
    ) -> Result<Vec<StoredEquity>, EquityError> {
        let (clause, params) = filter_clause(filter, placeholder);
        let sql = format!(
            "SELECT {EQUITY_COLUMNS} FROM t_equity WHERE {clause} ORDER BY utc_st ASC, rowid ASC LIMIT ? OFFSET ?"
        );

        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        let rows = query
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| stored_from_row(row).map_err(EquityError::from))
            .collect()
    }

    async fn count(&self, filter: &EquityFilter) -> Result<i64, EquityError> {
        let (clause, params) = filter_clause(filter, placeholder);
        let sql = format!("SELECT COUNT(*) FROM t_equity WHERE {clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for param in params {
            query = query.bind(param);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }
}
