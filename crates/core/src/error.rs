//! Error types for the external collaborators.

use kiosk_provisioner_types::{SuiAddress, TransactionDigest};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a ledger client.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// No usable response from the node.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node answered and refused the transaction.
    #[error("Ledger rejected request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The node answered with something that could not be interpreted.
    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),

    /// The sender's coins cannot pay for the gas budget.
    #[error("Gas budget {budget} exceeds the {balance} held by {owner}")]
    InsufficientGas {
        owner: SuiAddress,
        budget: u64,
        balance: u64,
    },

    /// Finality was not observed in time.
    #[error("Transaction {digest} not final after {after:?}")]
    FinalityTimeout {
        digest: TransactionDigest,
        after: Duration,
    },
}

/// Errors from the package build toolchain.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// The package directory does not exist.
    #[error("Package path not found: {}", .0.display())]
    MissingPackage(PathBuf),

    /// The toolchain could not be started.
    #[error("Failed to run build toolchain: {0}")]
    Spawn(String),

    /// The toolchain exited with a failure.
    #[error("Build toolchain exited with {status:?}: {stderr}")]
    ToolchainFailed { status: Option<i32>, stderr: String },

    /// The toolchain output could not be parsed.
    #[error("Malformed build output: {0}")]
    MalformedOutput(String),
}
