//! Provisioning errors.

use kiosk_provisioner_builder::TransactionBuildError;
use kiosk_provisioner_core::{BuildError, LedgerError};
use kiosk_provisioner_executor::SubmissionError;
use kiosk_provisioner_types::{
    ExecutionStatus, IdentifierError, RoyaltyError, TransactionDigest, TypeTagError,
};
use std::fmt;
use thiserror::Error;

/// Which transaction of the sequence an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    /// Publishing the kiosk rules package.
    RulesPublish,
    /// Publishing the main package.
    Publish,
    /// Creating the transfer policy.
    PolicyCreation,
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionStage::RulesPublish => write!(f, "rules publish"),
            ProvisionStage::Publish => write!(f, "publish"),
            ProvisionStage::PolicyCreation => write!(f, "policy creation"),
        }
    }
}

/// Error returned by a provisioning run or an accessor.
///
/// `Clone` so that every caller waiting on the same run receives the same
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// The request was rejected before any transaction was built.
    #[error("Invalid provisioning request: {0}")]
    InvalidRequest(String),

    /// The package build toolchain failed.
    #[error("Package build failed: {0}")]
    BuildFailed(String),

    /// No usable response from the ledger, or no confirmation in time.
    #[error("Ledger transport error: {0}")]
    TransportError(String),

    /// The ledger reported a non-success status.
    #[error("{stage} transaction {digest} rejected: {status}")]
    TransactionRejected {
        stage: ProvisionStage,
        digest: TransactionDigest,
        status: ExecutionStatus,
    },

    /// The transaction builder rejected its inputs.
    #[error("Failed to build transaction: {0}")]
    TransactionBuild(String),

    /// A successful report lacks an expected change.
    #[error("{stage} effects lack {what}")]
    PreconditionNotFound { stage: ProvisionStage, what: String },

    /// The provisioning run was dropped before it finished.
    #[error("Provisioning was cancelled")]
    Cancelled,

    /// Provisioning has not completed.
    #[error("Provisioning results are not ready")]
    NotReady,
}

impl ProvisionError {
    /// Attribute a submission failure to `stage`.
    pub fn from_submission(stage: ProvisionStage, error: SubmissionError) -> Self {
        match error {
            SubmissionError::TransactionRejected { digest, status } => {
                ProvisionError::TransactionRejected {
                    stage,
                    digest,
                    status,
                }
            }
            SubmissionError::Transport(e) => {
                ProvisionError::TransportError(format!("{stage}: {e}"))
            }
            SubmissionError::ConfirmationTimeout { digest, after } => ProvisionError::TransportError(
                format!("{stage}: transaction {digest} not confirmed within {after:?}"),
            ),
        }
    }

    /// Whether the error is a precondition failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ProvisionError::PreconditionNotFound { .. })
    }
}

impl From<BuildError> for ProvisionError {
    fn from(e: BuildError) -> Self {
        ProvisionError::BuildFailed(e.to_string())
    }
}

impl From<TransactionBuildError> for ProvisionError {
    fn from(e: TransactionBuildError) -> Self {
        ProvisionError::TransactionBuild(e.to_string())
    }
}

impl From<LedgerError> for ProvisionError {
    fn from(e: LedgerError) -> Self {
        ProvisionError::TransportError(e.to_string())
    }
}

impl From<RoyaltyError> for ProvisionError {
    fn from(e: RoyaltyError) -> Self {
        ProvisionError::InvalidRequest(e.to_string())
    }
}

impl From<IdentifierError> for ProvisionError {
    fn from(e: IdentifierError) -> Self {
        ProvisionError::InvalidRequest(e.to_string())
    }
}

impl From<TypeTagError> for ProvisionError {
    fn from(e: TypeTagError) -> Self {
        ProvisionError::InvalidRequest(e.to_string())
    }
}
