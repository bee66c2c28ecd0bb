// Fixed-width identifiers for owners and assets.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseIdentifierError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("expected at most {expected} bytes, got {actual}")]
    TooLong { expected: usize, actual: usize },
}

macro_rules! fixed_bytes {
    ($(#[$doc:meta])* $name:ident, $len:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;
            pub const ZERO: Self = Self([0u8; $len]);

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// The all-zero value is never a valid identifier.
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        /// Accepts an optional `0x` prefix and odd-length input. Shorter
        /// values are left-padded with zero bytes.
        impl FromStr for $name {
            type Err = ParseIdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s
                    .strip_prefix("0x")
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(s);
                let decoded = if digits.len() % 2 == 1 {
                    hex::decode(format!("0{digits}"))?
                } else {
                    hex::decode(digits)?
                };
                if decoded.len() > $len {
                    return Err(ParseIdentifierError::TooLong {
                        expected: $len,
                        actual: decoded.len(),
                    });
                }

                let mut bytes = [0u8; $len];
                bytes[$len - decoded.len()..].copy_from_slice(&decoded);
                Ok(Self(bytes))
            }
        }

        /// `0x`-prefixed lowercase hex at full width. This is also the
        /// persisted column form.
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(D::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// Owner of an equity position.
    Address,
    20
);

fixed_bytes!(
    /// Asset code or asset instance id.
    Hash,
    32
);
