//! Core ledger types for package and transfer-policy provisioning.
//!
//! Everything the provisioning pipeline passes between components lives
//! here: identifiers, digests, structured type tags, object references,
//! effects reports, programmable transactions and keys.

mod artifact;
mod crypto;
mod digest;
mod effects;
mod identifiers;
mod object;
mod royalty;
mod signing;
mod transaction;
mod type_tag;
mod wire;

pub use artifact::BuildArtifact;
pub use crypto::{KeyError, KeyPair, PublicKey, Signature, SignatureScheme};
pub use digest::{Digest, DigestError, ObjectDigest, TransactionDigest};
pub use effects::{ExecutionStatus, ObjectChange, TransactionEffectsReport};
pub use identifiers::{
    parse_hex_literal, IdentifierError, ObjectId, PackageId, SequenceNumber, SuiAddress,
    ADDRESS_LENGTH,
};
pub use object::{ObjectRef, Owner};
pub use royalty::{RoyaltyConfig, RoyaltyError, MAX_BASIS_POINTS};
pub use signing::{
    transaction_digest_message, transaction_intent_message, transaction_signing_digest,
    DOMAIN_TRANSACTION_DIGEST, INTENT_TRANSACTION_DATA,
};
pub use transaction::{
    Argument, CallArg, Command, MoveCall, ProgrammableTransaction, SignedTransaction,
    TransactionData,
};
pub use type_tag::{is_valid_identifier, StructTag, TypeTag, TypeTagError, MAX_TYPE_DEPTH};
