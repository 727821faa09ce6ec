//! Transaction construction errors.

use kiosk_provisioner_types::{ObjectRef, TypeTagError};
use thiserror::Error;

/// Inputs rejected before a transaction is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionBuildError {
    /// An identifier that must name something is all zeros.
    #[error("{what} must not be the zero identifier")]
    ZeroIdentifier { what: &'static str },

    /// An object reference with version 0, a zero id or an all-zero digest.
    #[error("Malformed {what} reference: {object_ref}")]
    MalformedObjectRef {
        what: &'static str,
        object_ref: ObjectRef,
    },

    /// The artifact carries no modules.
    #[error("Artifact contains no modules")]
    NoModules,

    /// One of the artifact's modules has no bytecode.
    #[error("Module {index} of the artifact is empty")]
    EmptyModule { index: usize },

    /// The policy target does not form a valid Move type.
    #[error("Invalid policy target: {0}")]
    InvalidTarget(#[from] TypeTagError),

    /// Gas budget of zero.
    #[error("Gas budget must be positive")]
    ZeroGasBudget,

    /// More inputs or commands than an argument index can address.
    #[error("Too many {what} in one transaction")]
    Overflow { what: &'static str },
}
