use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{Address, EquityError, Hash, codec};

/// An owner's holding of one asset instance, as callers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEquity {
    pub asset_code: Hash,
    pub asset_id: Hash,
    #[serde(with = "codec::decimal")]
    pub equity: BigUint,
}

impl AssetEquity {
    pub fn new(asset_code: Hash, asset_id: Hash, equity: impl Into<BigUint>) -> Self {
        Self {
            asset_code,
            asset_id,
            equity: equity.into(),
        }
    }
}

/// Natural key of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EquityKey {
    pub owner: Address,
    pub asset_id: Hash,
}

/// A row of `t_equity` in its persisted form. The balance stays a decimal
/// string here; only the DAO converts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEquity {
    pub owner: Address,
    pub asset_code: Hash,
    pub asset_id: Hash,
    pub equity: String,
    pub created_at: i64,
    pub version: i64,
}

impl StoredEquity {
    pub fn key(&self) -> EquityKey {
        EquityKey {
            owner: self.owner,
            asset_id: self.asset_id,
        }
    }

    pub(crate) fn to_asset_equity(&self) -> Result<AssetEquity, EquityError> {
        Ok(AssetEquity {
            asset_code: self.asset_code,
            asset_id: self.asset_id,
            equity: codec::decode(&self.equity)?,
        })
    }
}

/// Which positions a paged scan or count covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquityFilter {
    Owner(Address),
    Code(Hash),
    OwnerAndCode(Address, Hash),
}

impl EquityFilter {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Owner(_) => "owner",
            Self::Code(_) => "code",
            Self::OwnerAndCode(..) => "owner_code",
        }
    }

    pub fn matches(&self, row: &StoredEquity) -> bool {
        match self {
            Self::Owner(owner) => row.owner == *owner,
            Self::Code(code) => row.asset_code == *code,
            Self::OwnerAndCode(owner, code) => row.owner == *owner && row.asset_code == *code,
        }
    }
}

/// A page of positions together with the total the count query reported.
///
/// The total and the items come from two separate round trips. Writes that
/// land in between can make them disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<AssetEquity>,
    pub total: i64,
}

impl Page {
    /// Reported in place of a total when no count was computed.
    pub const UNKNOWN_TOTAL: i64 = -1;

    /// The total a "with total" call reports: the counted rows on success,
    /// [`Page::UNKNOWN_TOTAL`] on any error.
    pub fn reported_total(result: &Result<Page, EquityError>) -> i64 {
        match result {
            Ok(page) => page.total,
            Err(_) => Self::UNKNOWN_TOTAL,
        }
    }
}
