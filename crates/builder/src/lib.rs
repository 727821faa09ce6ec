//! Transaction construction for provisioning.
//!
//! Builds the two dependent transactions of a provisioning run:
//!
//! 1. [`build_publish_transaction`] uploads a compiled package and keeps the
//!    upgrade capability with the sender.
//! 2. [`build_policy_transaction`] / [`PolicyTransactionBuilder`] create a
//!    transfer policy for a type of that package, optionally attach rules,
//!    keep the policy capability with the sender and share the policy.
//!
//! Nothing here performs I/O. Inputs are validated before anything is
//! assembled and rejected with [`TransactionBuildError`].

mod error;
mod policy;
mod ptb;
mod publish;

pub use error::TransactionBuildError;
pub use policy::{build_policy_transaction, PolicyRules, PolicyTarget, PolicyTransactionBuilder};
pub use ptb::ProgrammableTransactionBuilder;
pub use publish::build_publish_transaction;
