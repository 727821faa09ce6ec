//! Collaborator traits at the boundary of the provisioning core.

use crate::{BuildError, LedgerError};
use async_trait::async_trait;
use kiosk_provisioner_types::{
    BuildArtifact, KeyPair, ObjectRef, PublicKey, Signature, SignedTransaction, SuiAddress,
    TransactionDigest, TransactionEffectsReport,
};
use std::path::Path;

/// What the ledger should include in an execution response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseOptions {
    /// Include the execution status and effects.
    pub show_effects: bool,
    /// Include the object-change records.
    pub show_object_changes: bool,
}

impl ResponseOptions {
    /// Effects and object changes both visible.
    ///
    /// The provisioner always asks for both: object changes are the only
    /// way it learns the identifiers a transaction created.
    pub fn full() -> Self {
        Self {
            show_effects: true,
            show_object_changes: true,
        }
    }
}

/// Gas coins and price chosen for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPayment {
    pub coins: Vec<ObjectRef>,
    pub price: u64,
}

impl GasPayment {
    pub fn new(coins: Vec<ObjectRef>, price: u64) -> Self {
        Self { coins, price }
    }
}

/// Client for a ledger full node.
///
/// The handle is shared read-only across tasks; implementations must be
/// safe to call concurrently.
///
/// # Example
///
/// ```ignore
/// let report = ledger
///     .execute_transaction(&signed, ResponseOptions::full())
///     .await?;
/// if report.is_success() {
///     ledger.wait_for_finality(&report.digest).await?;
/// }
/// ```
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Pick coins owned by `owner` covering `budget`, at the current
    /// reference gas price.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientGas`] if the owner's coins do not cover
    ///   the budget
    /// - any transport or response error of the underlying queries
    async fn select_gas(&self, owner: SuiAddress, budget: u64) -> Result<GasPayment, LedgerError>;

    /// Submit a signed transaction and return its reported effects.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Transport`] if no response was received
    /// - [`LedgerError::Rejected`] if the node refused the transaction
    ///   before execution
    /// - [`LedgerError::MalformedResponse`] if the response could not be
    ///   interpreted
    async fn execute_transaction(
        &self,
        transaction: &SignedTransaction,
        options: ResponseOptions,
    ) -> Result<TransactionEffectsReport, LedgerError>;

    /// Wait until the transaction with `digest` is final.
    async fn wait_for_finality(&self, digest: &TransactionDigest) -> Result<(), LedgerError>;
}

/// Turns a package source directory into deployable bytecode.
#[async_trait]
pub trait PackageBuilder: Send + Sync {
    /// Build the package at `package_path`.
    async fn build(&self, package_path: &Path) -> Result<BuildArtifact, BuildError>;
}

/// Opaque signing capability.
///
/// The provisioner never sees key material, only this interface.
pub trait TransactionSigner: Send + Sync {
    /// Address transactions are sent from.
    fn address(&self) -> SuiAddress;

    /// Public key matching [`TransactionSigner::sign`].
    fn public_key(&self) -> PublicKey;

    /// Sign a message.
    fn sign(&self, message: &[u8]) -> Signature;
}

impl TransactionSigner for KeyPair {
    fn address(&self) -> SuiAddress {
        KeyPair::address(self)
    }

    fn public_key(&self) -> PublicKey {
        KeyPair::public_key(self)
    }

    fn sign(&self, message: &[u8]) -> Signature {
        KeyPair::sign(self, message)
    }
}
