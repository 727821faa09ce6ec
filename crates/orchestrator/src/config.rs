//! Provisioning request.

use crate::ProvisionError;
use kiosk_provisioner_builder::PolicyTarget;
use kiosk_provisioner_types::{is_valid_identifier, RoyaltyConfig};
use std::path::PathBuf;

/// What to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Source directory of the main package.
    pub package_path: PathBuf,

    /// Source directory of the kiosk rules package.
    ///
    /// When set, the rules package is published first and its royalty,
    /// kiosk-lock and personal-kiosk rules are attached to the policy.
    pub rules_path: Option<PathBuf>,

    /// Royalty rule parameters. Only used with a rules package.
    pub royalty: RoyaltyConfig,

    /// Type the transfer policy is created for.
    pub policy_target: PolicyTarget,

    /// Gas budget of each transaction.
    pub gas_budget: u64,
}

impl Default for ProvisionRequest {
    fn default() -> Self {
        Self {
            package_path: PathBuf::from("../sword"),
            rules_path: None,
            royalty: RoyaltyConfig::default(),
            policy_target: PolicyTarget::default(),
            gas_budget: 100_000_000,
        }
    }
}

impl ProvisionRequest {
    /// Request for the package at `package_path` with default settings.
    pub fn new(package_path: impl Into<PathBuf>) -> Self {
        Self {
            package_path: package_path.into(),
            ..Default::default()
        }
    }

    /// Publish and attach the rules package at `rules_path`.
    pub fn with_rules_path(mut self, rules_path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(rules_path.into());
        self
    }

    pub fn with_royalty(mut self, royalty: RoyaltyConfig) -> Self {
        self.royalty = royalty;
        self
    }

    pub fn with_policy_target(mut self, policy_target: PolicyTarget) -> Self {
        self.policy_target = policy_target;
        self
    }

    pub fn with_gas_budget(mut self, gas_budget: u64) -> Self {
        self.gas_budget = gas_budget;
        self
    }

    /// Check everything that can be checked before touching the toolchain or
    /// the ledger.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.gas_budget == 0 {
            return Err(ProvisionError::InvalidRequest(
                "gas budget must be positive".to_string(),
            ));
        }
        for ident in [&self.policy_target.module, &self.policy_target.name] {
            if !is_valid_identifier(ident) {
                return Err(ProvisionError::InvalidRequest(format!(
                    "policy target {}::{} is not a valid Move type name",
                    self.policy_target.module, self.policy_target.name
                )));
            }
        }
        Ok(())
    }
}
