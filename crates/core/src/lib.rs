//! Collaborator boundary for the provisioning core.
//!
//! The provisioner talks to three external systems, each behind one trait:
//!
//! - [`LedgerClient`] - selects gas coins, submits signed transactions and
//!   reports effects
//! - [`PackageBuilder`] - compiles a package directory into bytecode
//! - [`TransactionSigner`] - supplies an address and a signing capability
//!
//! Concrete adapters live in `kiosk-provisioner-client`; in-process fakes
//! live in `kiosk-provisioner-test-helpers`.

mod error;
mod traits;

pub use error::{BuildError, LedgerError};
pub use traits::{GasPayment, LedgerClient, PackageBuilder, ResponseOptions, TransactionSigner};
