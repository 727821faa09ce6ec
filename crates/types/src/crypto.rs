//! Cryptographic key pairs and signatures.
//!
//! Supports:
//! - ED25519: the admin signer that publishes packages and creates policies
//!
//! Keys are imported and exported as base64 of `flag || 32-byte seed`, the
//! keystore format used by ledger CLIs. A serialized [`Signature`] carries the
//! scheme flag and the public key alongside the raw signature so a verifier
//! needs nothing else.

use crate::{Digest, SuiAddress};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Supported signature schemes, with their wire flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// ED25519 - Fast, widely supported.
    Ed25519,
}

impl SignatureScheme {
    /// Flag byte prefixed to keys and signatures.
    pub fn flag(self) -> u8 {
        match self {
            SignatureScheme::Ed25519 => 0x00,
        }
    }

    /// Look up a scheme by its flag byte.
    pub fn from_flag(flag: u8) -> Result<Self, KeyError> {
        match flag {
            0x00 => Ok(SignatureScheme::Ed25519),
            other => Err(KeyError::UnsupportedScheme(other)),
        }
    }
}

/// A cryptographic key pair for signing.
///
/// Not `Clone`. `Debug` prints only the public key.
pub enum KeyPair {
    /// ED25519 key pair.
    Ed25519(ed25519_dalek::SigningKey),
}

impl KeyPair {
    /// Generate a new random Ed25519 keypair.
    pub fn generate_ed25519() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        KeyPair::Ed25519(signing_key)
    }

    /// Generate a keypair from a seed (for testing).
    pub fn from_seed(scheme: SignatureScheme, seed: &[u8; 32]) -> Self {
        match scheme {
            SignatureScheme::Ed25519 => {
                KeyPair::Ed25519(ed25519_dalek::SigningKey::from_bytes(seed))
            }
        }
    }

    /// Import from base64 `flag || seed`.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|_| KeyError::InvalidEncoding)?;
        let (flag, seed) = bytes.split_first().ok_or(KeyError::InvalidEncoding)?;
        let scheme = SignatureScheme::from_flag(*flag)?;
        let seed: [u8; 32] = seed.try_into().map_err(|_| KeyError::InvalidLength {
            expected: 33,
            actual: bytes.len(),
        })?;
        Ok(Self::from_seed(scheme, &seed))
    }

    /// Export as base64 `flag || seed`.
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(33);
        bytes.push(self.scheme().flag());
        match self {
            KeyPair::Ed25519(signing_key) => bytes.extend_from_slice(&signing_key.to_bytes()),
        }
        BASE64.encode(bytes)
    }

    /// Signature scheme of this key.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            KeyPair::Ed25519(_) => SignatureScheme::Ed25519,
        }
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        match self {
            KeyPair::Ed25519(signing_key) => {
                use ed25519_dalek::Signer;
                let sig = signing_key.sign(message);
                Signature {
                    scheme: SignatureScheme::Ed25519,
                    signature: sig.to_bytes().to_vec(),
                    public_key: self.public_key(),
                }
            }
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Ed25519(signing_key) => {
                PublicKey::Ed25519(signing_key.verifying_key().to_bytes())
            }
        }
    }

    /// Account address controlled by this key.
    pub fn address(&self) -> SuiAddress {
        self.public_key().to_address()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({:?})", self.public_key())
    }
}

/// A public key for signature verification.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PublicKey {
    /// ED25519 public key (32 bytes).
    Ed25519([u8; 32]),
}

impl PublicKey {
    /// Scheme of this key.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            PublicKey::Ed25519(_) => SignatureScheme::Ed25519,
        }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(bytes) => bytes,
        }
    }

    /// Derive the account address: `blake2b256(flag || public key)`.
    pub fn to_address(&self) -> SuiAddress {
        let flag = [self.scheme().flag()];
        let digest = Digest::from_parts(&[&flag[..], self.as_bytes()]);
        SuiAddress::new(*digest.as_bytes())
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        if &signature.public_key != self {
            return false;
        }
        match self {
            PublicKey::Ed25519(pk_bytes) => {
                use ed25519_dalek::Verifier;
                let pk = match ed25519_dalek::VerifyingKey::from_bytes(pk_bytes) {
                    Ok(pk) => pk,
                    Err(_) => return false,
                };
                let sig_array: [u8; 64] = match signature.signature.as_slice().try_into() {
                    Ok(arr) => arr,
                    Err(_) => return false,
                };
                let sig = ed25519_dalek::Signature::from_bytes(&sig_array);
                pk.verify(message, &sig).is_ok()
            }
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKey::Ed25519(bytes) => {
                write!(f, "PublicKey::Ed25519({})", hex::encode(bytes))
            }
        }
    }
}

/// A signature together with its scheme and signer's public key.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    scheme: SignatureScheme,
    signature: Vec<u8>,
    public_key: PublicKey,
}

impl Signature {
    /// Public key of the signer.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Serialize as `flag || signature || public key`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.signature.len() + 32);
        bytes.push(self.scheme.flag());
        bytes.extend_from_slice(&self.signature);
        bytes.extend_from_slice(self.public_key.as_bytes());
        bytes
    }

    /// Parse `flag || signature || public key`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let (flag, rest) = bytes.split_first().ok_or(KeyError::InvalidEncoding)?;
        match SignatureScheme::from_flag(*flag)? {
            SignatureScheme::Ed25519 => {
                if rest.len() != 96 {
                    return Err(KeyError::InvalidLength {
                        expected: 97,
                        actual: bytes.len(),
                    });
                }
                let mut pk = [0u8; 32];
                pk.copy_from_slice(&rest[64..]);
                Ok(Signature {
                    scheme: SignatureScheme::Ed25519,
                    signature: rest[..64].to_vec(),
                    public_key: PublicKey::Ed25519(pk),
                })
            }
        }
    }

    /// Serialized form as base64, as sent to the ledger.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.to_bytes())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature::{:?}({}..)",
            self.scheme,
            &hex::encode(&self.signature)[..16]
        )
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base64())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = if deserializer.is_human_readable() {
            let encoded = String::deserialize(deserializer)?;
            BASE64.decode(encoded).map_err(serde::de::Error::custom)?
        } else {
            Vec::<u8>::deserialize(deserializer)?
        };
        Signature::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Errors from key and signature decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Not valid base64, or empty.
    #[error("Invalid key encoding")]
    InvalidEncoding,

    /// Unknown scheme flag.
    #[error("Unsupported signature scheme flag: {0:#04x}")]
    UnsupportedScheme(u8),

    /// Wrong number of bytes.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
}
