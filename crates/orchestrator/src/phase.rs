//! Provisioning phases.

use crate::{ProvisionError, ProvisioningResult};
use kiosk_provisioner_types::{ObjectId, PackageId};
use std::fmt;
use std::sync::Arc;

/// State of a [`Provisioner`](crate::Provisioner).
///
/// ```text
/// Uninitialized ─► [PublishingRules] ─► PublishingPackage ─► PublishingPolicyPrereqs
///                                                                    │
///                          Ready ◄──────────── CreatingPolicy ◄──────┘
///
/// any non-terminal state ─► Failed
/// ```
#[derive(Debug, Clone)]
pub enum ProvisionPhase {
    Uninitialized,
    PublishingRules,
    PublishingPackage,
    PublishingPolicyPrereqs {
        package_id: PackageId,
        publisher: ObjectId,
    },
    CreatingPolicy {
        package_id: PackageId,
        publisher: ObjectId,
    },
    Ready(Arc<ProvisioningResult>),
    Failed(ProvisionError),
}

impl ProvisionPhase {
    pub fn snapshot(&self) -> PhaseSnapshot {
        match self {
            ProvisionPhase::Uninitialized => PhaseSnapshot::Uninitialized,
            ProvisionPhase::PublishingRules => PhaseSnapshot::PublishingRules,
            ProvisionPhase::PublishingPackage => PhaseSnapshot::PublishingPackage,
            ProvisionPhase::PublishingPolicyPrereqs { .. } => PhaseSnapshot::PublishingPolicyPrereqs,
            ProvisionPhase::CreatingPolicy { .. } => PhaseSnapshot::CreatingPolicy,
            ProvisionPhase::Ready(_) => PhaseSnapshot::Ready,
            ProvisionPhase::Failed(_) => PhaseSnapshot::Failed,
        }
    }

    /// `Ready` and `Failed` are never left.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProvisionPhase::Ready(_) | ProvisionPhase::Failed(_))
    }
}

/// Discriminant of [`ProvisionPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseSnapshot {
    Uninitialized,
    PublishingRules,
    PublishingPackage,
    PublishingPolicyPrereqs,
    CreatingPolicy,
    Ready,
    Failed,
}

impl fmt::Display for PhaseSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseSnapshot::Uninitialized => "uninitialized",
            PhaseSnapshot::PublishingRules => "publishing_rules",
            PhaseSnapshot::PublishingPackage => "publishing_package",
            PhaseSnapshot::PublishingPolicyPrereqs => "publishing_policy_prereqs",
            PhaseSnapshot::CreatingPolicy => "creating_policy",
            PhaseSnapshot::Ready => "ready",
            PhaseSnapshot::Failed => "failed",
        };
        f.write_str(name)
    }
}
