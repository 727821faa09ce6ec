//! Production adapters and command-line entry point for the provisioner.
//!
//! The orchestrator only knows the collaborator traits from
//! `kiosk-provisioner-core`. This crate supplies their real implementations:
//!
//! ```text
//! ┌──────────────────────┐    LedgerClient     ┌──────────────────────┐
//! │                      │ ──────────────────► │ JsonRpcLedgerClient  │ ──► full node (HTTP)
//! │     Provisioner      │                     └──────────────────────┘
//! │                      │    PackageBuilder   ┌──────────────────────┐
//! │                      │ ──────────────────► │ MoveToolchain        │ ──► `sui move build`
//! └──────────────────────┘                     └──────────────────────┘
//!            ▲
//!            │ ProvisionRequest, ExecutorConfig, admin KeyPair
//! ┌──────────────────────┐
//! │ ProvisionerConfig    │ ◄── TOML file + KIOSK_PROVISIONER_ADMIN_KEY
//! └──────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`JsonRpcLedgerClient`] - JSON-RPC 2.0 ledger client with finality polling
//! - [`MoveToolchain`] - Package builds via the `sui` binary
//! - [`ProvisionerConfig`] - Configuration file and environment overrides
//! - [`ProvisionSummary`] - Human and JSON output of a finished run

pub mod config;
pub mod rpc;
pub mod summary;
pub mod toolchain;

pub use config::{ConfigError, Network, ProvisionerConfig, ADMIN_KEY_ENV};
pub use rpc::JsonRpcLedgerClient;
pub use summary::ProvisionSummary;
pub use toolchain::{parse_build_output, MoveToolchain};
