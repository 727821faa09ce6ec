//! Domain-separated signing for transactions.
//!
//! This module provides the domain separation for every message the
//! provisioner signs or hashes. Domain separation prevents a signature or
//! digest from one context from being replayed in another.
//!
//! # Domain Tags
//!
//! | Tag | Purpose |
//! |-----|---------|
//! | `[0, 0, 0]` intent prefix | transaction signatures |
//! | `TransactionData::` | transaction digests |
//!
//! The signature covers the Blake2b-256 digest of the intent message, not
//! the intent message itself. Transaction bytes are the BCS encoding
//! produced by [`TransactionData::to_bytes`](crate::TransactionData::to_bytes).

use crate::Digest;

/// Intent prefix for transaction signatures.
///
/// Format: scope (transaction data) || version || app id.
pub const INTENT_TRANSACTION_DATA: [u8; 3] = [0, 0, 0];

/// Domain tag for transaction digests.
///
/// Format: `TransactionData::` || encoded transaction
pub const DOMAIN_TRANSACTION_DIGEST: &[u8] = b"TransactionData::";

/// Build the intent message for a transaction signature.
pub fn transaction_intent_message(tx_bytes: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(INTENT_TRANSACTION_DATA.len() + tx_bytes.len());
    message.extend_from_slice(&INTENT_TRANSACTION_DATA);
    message.extend_from_slice(tx_bytes);
    message
}

/// The 32 bytes a signer actually signs for a transaction.
pub fn transaction_signing_digest(tx_bytes: &[u8]) -> Digest {
    Digest::from_bytes(&transaction_intent_message(tx_bytes))
}

/// Build the message hashed into a transaction digest.
pub fn transaction_digest_message(tx_bytes: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(DOMAIN_TRANSACTION_DIGEST.len() + tx_bytes.len());
    message.extend_from_slice(DOMAIN_TRANSACTION_DIGEST);
    message.extend_from_slice(tx_bytes);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_message_deterministic() {
        let msg1 = transaction_intent_message(b"tx");
        let msg2 = transaction_intent_message(b"tx");

        assert_eq!(msg1, msg2);
        assert!(msg1.starts_with(&INTENT_TRANSACTION_DATA));
    }

    #[test]
    fn test_different_domains_produce_different_messages() {
        let intent = transaction_intent_message(b"same bytes");
        let digest = transaction_digest_message(b"same bytes");

        assert_ne!(intent, digest);
        assert!(digest.starts_with(DOMAIN_TRANSACTION_DIGEST));
    }

    #[test]
    fn test_signing_digest_differs_from_transaction_digest() {
        let signing = transaction_signing_digest(b"tx");
        let tx_digest = Digest::from_bytes(&transaction_digest_message(b"tx"));
        assert_ne!(signing, tx_digest);
    }
}
