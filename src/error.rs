use thiserror::Error;

/// Every failure the equity layer reports.
///
/// Nothing here is retried internally. `Conflict` is the signal callers use
/// to decide whether to re-read and try again.
#[derive(Debug, Error)]
pub enum EquityError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Equity not found")]
    NotFound,

    /// The write matched no row: a concurrent insert won, or the version
    /// observed before the write is no longer current.
    #[error("Conflict: {operation} affected {affected} rows")]
    Conflict {
        operation: &'static str,
        affected: u64,
    },

    #[error("Malformed number: {0:?}")]
    MalformedNumber(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl EquityError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
