//! Printable outcome of a provisioning run.

use kiosk_provisioner_orchestrator::ProvisioningResult;
use kiosk_provisioner_types::{ObjectId, PackageId, SuiAddress, TransactionDigest};
use serde::Serialize;
use std::fmt;

/// Identifiers a deployment needs after provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionSummary {
    pub admin: SuiAddress,
    pub package_id: PackageId,
    pub publisher_object_id: ObjectId,
    pub policy_id: ObjectId,
    pub policy_cap_id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_package_id: Option<PackageId>,
    pub publish_digest: TransactionDigest,
    pub policy_digest: TransactionDigest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_digest: Option<TransactionDigest>,
}

impl ProvisionSummary {
    pub fn new(admin: SuiAddress, result: &ProvisioningResult) -> Self {
        Self {
            admin,
            package_id: result.package_id,
            publisher_object_id: result.publisher_object_id,
            policy_id: result.policy_id,
            policy_cap_id: result.policy_cap_id,
            rules_package_id: result.rules_package_id,
            publish_digest: result.publish_response.digest,
            policy_digest: result.policy_response.digest,
            rules_digest: result.rules_response.as_ref().map(|report| report.digest),
        }
    }
}

impl fmt::Display for ProvisionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "admin:          {}", self.admin)?;
        if let Some(rules_package_id) = &self.rules_package_id {
            writeln!(f, "rules package:  {}", rules_package_id)?;
        }
        writeln!(f, "package:        {}", self.package_id)?;
        writeln!(f, "publisher:      {}", self.publisher_object_id)?;
        writeln!(f, "policy:         {}", self.policy_id)?;
        writeln!(f, "policy cap:     {}", self.policy_cap_id)?;
        if let Some(rules_digest) = &self.rules_digest {
            writeln!(f, "rules tx:       {}", rules_digest)?;
        }
        writeln!(f, "publish tx:     {}", self.publish_digest)?;
        write!(f, "policy tx:      {}", self.policy_digest)
    }
}
