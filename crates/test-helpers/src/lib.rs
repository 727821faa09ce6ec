//! Test helpers for the kiosk provisioner.
//!
//! ```text
//! ┌──────────────────────┐     ┌────────────────────────────────────┐
//! │  FakePackageBuilder  │     │             FakeLedger             │
//! │  path → artifact     │     │                                    │
//! └──────────────────────┘     │  signature check                   │
//!                              │        │                           │
//!                              │        ▼                           │
//!                              │  interpreter (publish, move call,  │
//!                              │  transfer) over in-memory objects  │
//!                              │        │                           │
//!                              │        ▼                           │
//!                              │  effects report + event log        │
//!                              │  (logical clock, faults, gates)    │
//!                              └────────────────────────────────────┘
//! ```

mod fixtures;
mod interpreter;
mod ledger;
mod package_builder;

pub use fixtures::{
    admin_keypair, gas_coin, object_ref, rules_artifact, sword_artifact, ADMIN_SEED,
    REFERENCE_GAS_PRICE,
};
pub use ledger::{FakeLedger, Fault, LedgerEvent, LedgerEventKind, PauseGate};
pub use package_builder::FakePackageBuilder;
