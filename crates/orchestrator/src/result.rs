//! Memoized provisioning outcome.

use kiosk_provisioner_types::{ObjectId, PackageId, TransactionEffectsReport};

/// Identifiers and reports of a completed provisioning run.
///
/// Built once, then only shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub package_id: PackageId,
    pub publisher_object_id: ObjectId,
    pub policy_id: ObjectId,
    pub policy_cap_id: ObjectId,
    pub rules_package_id: Option<PackageId>,
    pub publish_response: TransactionEffectsReport,
    pub policy_response: TransactionEffectsReport,
    pub rules_response: Option<TransactionEffectsReport>,
}
