//! Cryptographic digest type using Blake2b-256.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte Blake2b-256 digest, the ledger's hash for transactions,
/// objects and addresses.
///
/// Rendered as base58, the way ledger explorers show transaction and object
/// digests. The binary encoding is length-prefixed bytes, matching the
/// ledger's own digest encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

/// Digest identifying a transaction.
pub type TransactionDigest = Digest;

/// Digest identifying one version of an object.
pub type ObjectDigest = Digest;

impl Digest {
    /// Size of digest in bytes.
    pub const BYTES: usize = 32;

    /// Zero digest (all bytes are 0x00).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create digest from bytes using Blake2b-256.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_hash(Blake2b256::digest(bytes).as_slice())
    }

    /// Wrap raw digest bytes (without hashing).
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create digest from multiple byte slices.
    pub fn from_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Blake2b256::new();
        for part in parts {
            hasher.update(part);
        }
        Self::from_hash(hasher.finalize().as_slice())
    }

    fn from_hash(hash: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(hash);
        Self(bytes)
    }

    /// Parse digest from a base58 string.
    pub fn from_base58(encoded: &str) -> Result<Self, DigestError> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|_| DigestError::InvalidBase58)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| DigestError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Convert digest to a base58 string.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Get bytes as slice reference.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero digest.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(self.0);
        write!(f, "Digest({}..{})", &hex[..8], &hex[56..])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let encoded = String::deserialize(deserializer)?;
            Self::from_base58(&encoded).map_err(serde::de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                serde::de::Error::invalid_length(bytes.len(), &"32 digest bytes")
            })?;
            Ok(Self(arr))
        }
    }
}

/// Errors that can occur when parsing digest strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// Decoded to the wrong number of bytes.
    #[error("Invalid digest length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Invalid base58 characters.
    #[error("Invalid base58 digest")]
    InvalidBase58,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let data = b"hello world";
        assert_eq!(Digest::from_bytes(data), Digest::from_bytes(data));
    }

    #[test]
    fn test_blake2b_256_known_value() {
        assert_eq!(
            hex::encode(Digest::from_bytes(b"").as_bytes()),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn test_binary_encoding_is_length_prefixed() {
        let digest = Digest::new([7u8; 32]);
        let bytes = bcs::to_bytes(&digest).unwrap();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 32);
        assert_eq!(bcs::from_bytes::<Digest>(&bytes).unwrap(), digest);
    }

    #[test]
    fn test_digest_parts_match_concatenation() {
        let joined = Digest::from_bytes(b"helloworld");
        let parts = Digest::from_parts(&[b"hello", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_base58_roundtrip() {
        let original = Digest::from_bytes(b"test data");
        let parsed = Digest::from_base58(&original.to_base58()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_base58_wrong_length() {
        let short = bs58::encode([1u8; 8]).into_string();
        assert_eq!(
            Digest::from_base58(&short),
            Err(DigestError::InvalidLength {
                expected: 32,
                actual: 8
            })
        );
        assert_eq!(Digest::from_base58("0OIl"), Err(DigestError::InvalidBase58));
    }

    #[test]
    fn test_is_zero() {
        assert!(Digest::ZERO.is_zero());
        assert!(!Digest::from_bytes(b"test").is_zero());
    }
}
