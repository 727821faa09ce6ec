//! Domain-specific identifier types.
//!
//! Ledger addresses, object ids and package ids all share the same 32-byte
//! representation and the same `0x`-prefixed hex literal form. Short literals
//! such as `0x2` are left-padded with zeros, so `0x2` and
//! `0x0000…0002` name the same identifier.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of every address-like identifier in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Errors that can occur when parsing identifier literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The literal had no hex digits.
    #[error("Empty identifier literal")]
    Empty,

    /// The literal did not start with `0x`.
    #[error("Identifier literal must start with 0x: {0}")]
    MissingPrefix(String),

    /// More than 64 hex digits.
    #[error("Identifier literal too long: {actual} hex digits (max 64)")]
    TooLong {
        /// Number of hex digits supplied.
        actual: usize,
    },

    /// Non-hex characters.
    #[error("Invalid hex in identifier literal: {0}")]
    InvalidHex(String),
}

/// Parse a `0x`-prefixed hex literal into 32 bytes, left-padding short input.
pub fn parse_hex_literal(literal: &str) -> Result<[u8; ADDRESS_LENGTH], IdentifierError> {
    let trimmed = literal.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| IdentifierError::MissingPrefix(trimmed.to_string()))?;

    if digits.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if digits.len() > ADDRESS_LENGTH * 2 {
        return Err(IdentifierError::TooLong {
            actual: digits.len(),
        });
    }

    let padded = format!("{:0>64}", digits);
    let mut bytes = [0u8; ADDRESS_LENGTH];
    hex::decode_to_slice(&padded, &mut bytes)
        .map_err(|_| IdentifierError::InvalidHex(trimmed.to_string()))?;
    Ok(bytes)
}

const fn short_address(last: u8) -> [u8; ADDRESS_LENGTH] {
    let mut bytes = [0u8; ADDRESS_LENGTH];
    bytes[ADDRESS_LENGTH - 1] = last;
    bytes
}

macro_rules! address_like {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; ADDRESS_LENGTH]);

        impl $name {
            /// The all-zero identifier. Never a valid reference.
            pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

            /// Create from raw bytes.
            pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Parse a `0x`-prefixed hex literal.
            pub fn from_hex_literal(literal: &str) -> Result<Self, IdentifierError> {
                parse_hex_literal(literal).map(Self)
            }

            /// Get the bytes as a slice.
            pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
                &self.0
            }

            /// Convert to a bytes array.
            pub fn to_bytes(self) -> [u8; ADDRESS_LENGTH] {
                self.0
            }

            /// Check if this is the zero identifier.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|&b| b == 0)
            }

            /// Full-width literal: `0x` followed by 64 hex digits.
            pub fn to_hex_literal(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Literal with leading zeros trimmed (`0x2`).
            pub fn to_short_literal(&self) -> String {
                let full = hex::encode(self.0);
                let trimmed = full.trim_start_matches('0');
                if trimmed.is_empty() {
                    "0x0".to_string()
                } else {
                    format!("0x{}", trimmed)
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex_literal())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_short_literal())
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex_literal(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_hex_literal())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let literal = String::deserialize(deserializer)?;
                    Self::from_hex_literal(&literal).map_err(serde::de::Error::custom)
                } else {
                    <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Self)
                }
            }
        }
    };
}

address_like! {
    /// Identifier of an on-ledger object.
    ObjectId
}

address_like! {
    /// Identifier of a published package.
    PackageId
}

address_like! {
    /// Account address of a transaction sender or object owner.
    SuiAddress
}

impl PackageId {
    /// The Move standard library (`0x1`).
    pub const MOVE_STDLIB: Self = Self(short_address(1));

    /// The Sui framework (`0x2`).
    pub const SUI_FRAMEWORK: Self = Self(short_address(2));
}

impl From<PackageId> for ObjectId {
    fn from(id: PackageId) -> Self {
        ObjectId(id.0)
    }
}

impl From<ObjectId> for PackageId {
    fn from(id: ObjectId) -> Self {
        PackageId(id.0)
    }
}

/// Object version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    /// Version zero. Never carried by a live object.
    pub const ZERO: Self = SequenceNumber(0);

    /// Get the next version.
    pub fn next(self) -> Self {
        SequenceNumber(self.0 + 1)
    }

    /// Get the raw value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
