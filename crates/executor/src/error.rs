//! Submission errors.

use kiosk_provisioner_core::LedgerError;
use kiosk_provisioner_types::{ExecutionStatus, TransactionDigest};
use std::time::Duration;
use thiserror::Error;

/// Why a submission did not produce a confirmed, successful report.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    /// The ledger executed or refused the transaction and reported a
    /// non-success status.
    #[error("Transaction {digest} rejected: {status}")]
    TransactionRejected {
        digest: TransactionDigest,
        status: ExecutionStatus,
    },

    /// No usable response from the ledger.
    #[error("Transport error: {0}")]
    Transport(LedgerError),

    /// Finality was not observed within the configured timeout.
    #[error("Transaction {digest} not confirmed within {after:?}")]
    ConfirmationTimeout {
        digest: TransactionDigest,
        after: Duration,
    },
}

impl SubmissionError {
    /// Classify a ledger client error for the transaction `digest`.
    ///
    /// A node refusing the transaction before execution is a rejection;
    /// everything else is transport.
    pub(crate) fn from_ledger(digest: TransactionDigest, error: LedgerError) -> Self {
        match error {
            LedgerError::Rejected { code, message } => SubmissionError::TransactionRejected {
                digest,
                status: ExecutionStatus::Failure {
                    error: format!("refused by node (code {code}): {message}"),
                },
            },
            LedgerError::FinalityTimeout { after, .. } => {
                SubmissionError::ConfirmationTimeout { digest, after }
            }
            other => SubmissionError::Transport(other),
        }
    }

    /// Digest of the affected transaction, when known.
    pub fn digest(&self) -> Option<TransactionDigest> {
        match self {
            SubmissionError::TransactionRejected { digest, .. }
            | SubmissionError::ConfirmationTimeout { digest, .. } => Some(*digest),
            SubmissionError::Transport(_) => None,
        }
    }
}
