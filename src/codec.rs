//! Decimal string form of equity balances.
//!
//! Balances are unbounded, so they never touch a machine integer on their way
//! to or from the `equity` column.

use num_bigint::BigUint;

use crate::EquityError;

/// Canonical base-10 form: digits only, no leading zeros except `"0"`.
pub fn encode(balance: &BigUint) -> String {
    balance.to_str_radix(10)
}

/// Parses a stored balance. Only a non-empty run of ASCII digits is accepted.
pub fn decode(raw: &str) -> Result<BigUint, EquityError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EquityError::MalformedNumber(raw.to_string()));
    }

    BigUint::parse_bytes(raw.as_bytes(), 10)
        .ok_or_else(|| EquityError::MalformedNumber(raw.to_string()))
}

/// Serde adapter that writes balances with [`encode`] and reads them with [`decode`].
pub mod decimal {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(balance: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(balance))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::decode(&raw).map_err(D::Error::custom)
    }
}
