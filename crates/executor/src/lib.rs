//! Submission executor.
//!
//! Signs a transaction, submits it through a [`LedgerClient`], rejects a
//! non-success status and waits for finality:
//!
//! ```text
//! TransactionData ──sign──► SignedTransaction ──execute──► report
//!                                                            │
//!                                     status != success ◄────┤
//!                                     TransactionRejected    │
//!                                                            ▼
//!                                            wait_for_finality (bounded)
//!                                                            │
//!                                                            ▼
//!                                                  TransactionEffectsReport
//! ```
//!
//! Nothing is retried. A failed submission is reported once and the caller
//! decides what to do.

mod config;
mod error;
mod executor;

pub use config::ExecutorConfig;
pub use error::SubmissionError;
pub use executor::{sign_transaction, SubmissionExecutor};
