pub mod memory;
pub mod postgres;
pub mod sqlite;

pub use memory::MemoryAdapter;
pub use postgres::PostgresAdapter;
pub use sqlite::SqliteAdapter;

use std::str::FromStr;

use sqlx::{ColumnIndex, Decode, Row, Type};

use crate::{EquityFilter, ParseIdentifierError, StoredEquity};

pub(crate) const EQUITY_COLUMNS: &str = "addr, id, code, equity, utc_st, version";

/// WHERE clause and its parameters for a filter. `placeholder` renders the
/// n-th (1-based) bind marker for the target dialect.
pub(crate) fn filter_clause(
    filter: &EquityFilter,
    placeholder: fn(usize) -> String,
) -> (String, Vec<String>) {
    match filter {
        EquityFilter::Owner(owner) => (format!("addr = {}", placeholder(1)), vec![owner.to_string()]),
        EquityFilter::Code(code) => (format!("code = {}", placeholder(1)), vec![code.to_string()]),
        EquityFilter::OwnerAndCode(owner, code) => (
            format!("addr = {} AND code = {}", placeholder(1), placeholder(2)),
            vec![owner.to_string(), code.to_string()],
        ),
    }
}

fn decode_identifier<T>(raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseIdentifierError>,
{
    raw.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Maps a `t_equity` row selected with [`EQUITY_COLUMNS`].
pub(crate) fn stored_from_row<R>(row: &R) -> Result<StoredEquity, sqlx::Error>
where
    R: Row,
    for<'c> &'c str: ColumnIndex<R>,
    for<'r> String: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
{
    Ok(StoredEquity {
        owner: decode_identifier(&row.try_get::<String, _>("addr")?)?,
        asset_id: decode_identifier(&row.try_get::<String, _>("id")?)?,
        asset_code: decode_identifier(&row.try_get::<String, _>("code")?)?,
        equity: row.try_get("equity")?,
        created_at: row.try_get("utc_st")?,
        version: row.try_get("version")?,
    })
}
