use crate::{Address, EquityError, Hash};

/// A pagination window that has already passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    offset: i64,
    limit: i64,
}

impl PageWindow {
    /// Rejects `start < 0` and `limit <= 0`.
    pub fn new(start: i64, limit: i64) -> Result<Self, EquityError> {
        if start < 0 {
            tracing::warn!(start, "rejected page window: start < 0");
            return Err(EquityError::InvalidArgument("start must not be negative"));
        }
        if limit <= 0 {
            tracing::warn!(limit, "rejected page window: limit <= 0");
            return Err(EquityError::InvalidArgument("limit must be positive"));
        }
        Ok(Self {
            offset: start,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

pub(crate) fn ensure_owner(owner: &Address) -> Result<(), EquityError> {
    if owner.is_zero() {
        tracing::warn!("rejected zero owner address");
        return Err(EquityError::InvalidArgument("owner address is zero"));
    }
    Ok(())
}

pub(crate) fn ensure_asset_id(id: &Hash) -> Result<(), EquityError> {
    if id.is_zero() {
        tracing::warn!("rejected zero asset id");
        return Err(EquityError::InvalidArgument("asset id is zero"));
    }
    Ok(())
}

pub(crate) fn ensure_asset_code(code: &Hash) -> Result<(), EquityError> {
    if code.is_zero() {
        tracing::warn!("rejected zero asset code");
        return Err(EquityError::InvalidArgument("asset code is zero"));
    }
    Ok(())
}
