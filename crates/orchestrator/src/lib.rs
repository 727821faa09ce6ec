//! Publish and transfer-policy provisioning.
//!
//! This crate provides the [`Provisioner`], which publishes a package,
//! creates a transfer policy for one of its types and memoizes the derived
//! identifiers for the lifetime of the instance.
//!
//! # Problem
//!
//! Creating a transfer policy takes two dependent ledger transactions:
//!
//! 1. **Publish** returns the package id and a `Publisher` object, known only
//!    from the publish effects.
//! 2. **Policy creation** consumes that exact `Publisher`, so it can only be
//!    built after the publish is final and its effects are parsed.
//!
//! Many callers need the resulting ids, but the sequence must run once.
//!
//! # Solution
//!
//! - **Single run**: a guard serializes callers; whoever arrives while the run
//!   is in flight waits for it and then observes its outcome
//! - **Memoized outcome**: `Ready` and `Failed` are terminal and cached
//! - **Fail closed**: a successful report that lacks an expected change
//!   fails the run rather than guessing
//! - **Cancellation safe**: dropping a run mid-sequence marks it `Cancelled`
//!
//! # Architecture
//!
//! ```text
//! provision()
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ [rules_path set] PublishingRules                            │
//! │   build rules package → publish → require `published`       │
//! └─────────────────────────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ PublishingPackage                                           │
//! │   build package → publish → wait for finality               │
//! │   require `published` + created 0x2::package::Publisher     │
//! └─────────────────────────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ PublishingPolicyPrereqs → CreatingPolicy                    │
//! │   transfer_policy::new<T>(publisher) [+ rules]              │
//! │   require TransferPolicy<T> + TransferPolicyCap<T> created  │
//! │   require publisher mutated                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            Ready(Arc<ProvisioningResult>)
//! ```
//!
//! # Components
//!
//! - [`Provisioner`] - The state machine and its accessors
//! - [`ProvisionRequest`] - What to publish and how to configure the policy
//! - [`ProvisionError`] - Terminal errors shared by every waiter

mod config;
mod error;
mod phase;
mod provisioner;
mod result;

pub use config::ProvisionRequest;
pub use error::{ProvisionError, ProvisionStage};
pub use phase::{PhaseSnapshot, ProvisionPhase};
pub use provisioner::Provisioner;
pub use result::ProvisioningResult;

pub use kiosk_provisioner_builder::PolicyTarget;
pub use kiosk_provisioner_executor::ExecutorConfig;
