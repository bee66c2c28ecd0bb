use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    EquityError, EquityFilter, EquityKey, EquityStore, PageWindow, PoolConfig, StoredEquity,
    adapters::{EQUITY_COLUMNS, filter_clause, stored_from_row},
};

/// PostgreSQL adapter over the `t_equity` table.
///
/// Schema:
/// ```sql
/// CREATE TABLE t_equity (
///     addr VARCHAR(42) NOT NULL,
///     id VARCHAR(66) NOT NULL,
///     code VARCHAR(66) NOT NULL,
///     equity TEXT NOT NULL,
///     utc_st BIGINT NOT NULL,
///     version BIGINT NOT NULL DEFAULT 1,
///     PRIMARY KEY (addr, id)
/// );
///
/// CREATE INDEX idx_equity_addr_utc_st ON t_equity(addr, utc_st);
/// CREATE INDEX idx_equity_code_utc_st ON t_equity(code, utc_st);
/// ```
///
/// Rows created in the same millisecond page out by asset id.
pub struct PostgresAdapter {
    pub(crate) pool: PgPool,
}

fn placeholder(n: usize) -> String {
    format!("${n}")
}

impl PostgresAdapter {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &PoolConfig) -> Result<Self, EquityError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<(), EquityError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS t_equity (
                addr VARCHAR(42) NOT NULL,
                id VARCHAR(66) NOT NULL,
                code VARCHAR(66) NOT NULL,
                equity TEXT NOT NULL,
                utc_st BIGINT NOT NULL,
                version BIGINT NOT NULL DEFAULT 1,
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
impl EquityStore for PostgresAdapter {
    async fn find(&self, key: &EquityKey) -> Result<Option<StoredEquity>, EquityError> {
        let sql = format!("SELECT {EQUITY_COLUMNS} FROM t_equity WHERE id = $1 AND addr = $2");
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
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (addr, id) DO NOTHING
            "#,
        )
        .bind(row.asset_code.to_string())
        .bind(row.asset_id.to_string())
        .bind(row.owner.to_string())
        .bind(&row.equity)
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
            SET equity = $1, version = version + 1
            WHERE id = $2 AND version = $3 AND addr = $4
            "#,
        )
        .bind(equity)
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
            "SELECT {EQUITY_COLUMNS} FROM t_equity WHERE {clause} ORDER BY utc_st ASC, id ASC LIMIT {} OFFSET {}",
            placeholder(params.len() + 1),
            placeholder(params.len() + 2),
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
