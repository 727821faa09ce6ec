//! Transaction effects as reported by the ledger.

use crate::{ObjectDigest, ObjectId, ObjectRef, Owner, PackageId, SequenceNumber, StructTag};
use crate::TransactionDigest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final execution status of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    /// Check if the transaction succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "success"),
            ExecutionStatus::Failure { error } => write!(f, "failure: {}", error),
        }
    }
}

/// One effect of a transaction on ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ObjectChange {
    /// A package was published.
    Published {
        package_id: PackageId,
        version: SequenceNumber,
        digest: ObjectDigest,
        modules: Vec<String>,
    },

    /// A new object was created.
    Created {
        object_id: ObjectId,
        object_type: StructTag,
        owner: Owner,
        version: SequenceNumber,
        digest: ObjectDigest,
    },

    /// An existing object was modified (including ownership changes).
    Mutated {
        object_id: ObjectId,
        object_type: StructTag,
        owner: Owner,
        version: SequenceNumber,
        digest: ObjectDigest,
    },

    /// An object was deleted or wrapped.
    Deleted {
        object_id: ObjectId,
        version: SequenceNumber,
    },
}

impl ObjectChange {
    /// Short name of the change kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectChange::Published { .. } => "published",
            ObjectChange::Created { .. } => "created",
            ObjectChange::Mutated { .. } => "mutated",
            ObjectChange::Deleted { .. } => "deleted",
        }
    }

    /// Object reference for changes that leave a live object behind.
    pub fn object_ref(&self) -> Option<ObjectRef> {
        match self {
            ObjectChange::Created {
                object_id,
                version,
                digest,
                ..
            }
            | ObjectChange::Mutated {
                object_id,
                version,
                digest,
                ..
            } => Some(ObjectRef::new(*object_id, *version, *digest)),
            ObjectChange::Published { .. } | ObjectChange::Deleted { .. } => None,
        }
    }
}

/// Result of submitting one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffectsReport {
    pub digest: TransactionDigest,
    pub status: ExecutionStatus,
    pub object_changes: Vec<ObjectChange>,
}

impl TransactionEffectsReport {
    /// Create a new report.
    pub fn new(
        digest: TransactionDigest,
        status: ExecutionStatus,
        object_changes: Vec<ObjectChange>,
    ) -> Self {
        Self {
            digest,
            status,
            object_changes,
        }
    }

    /// Check if the transaction succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Reported object changes, in report order.
    pub fn changes(&self) -> &[ObjectChange] {
        &self.object_changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Digest, SuiAddress};

    fn created(id: &str, ty: &str) -> ObjectChange {
        ObjectChange::Created {
            object_id: ObjectId::from_hex_literal(id).unwrap(),
            object_type: ty.parse().unwrap(),
            owner: Owner::AddressOwner(SuiAddress::from_hex_literal("0xa").unwrap()),
            version: SequenceNumber(1),
            digest: Digest::from_bytes(id.as_bytes()),
        }
    }

    #[test]
    fn test_object_ref_only_for_live_objects() {
        let change = created("0x10", "0x2::package::Publisher");
        let object_ref = change.object_ref().unwrap();
        assert_eq!(object_ref.object_id, ObjectId::from_hex_literal("0x10").unwrap());

        let deleted = ObjectChange::Deleted {
            object_id: ObjectId::from_hex_literal("0x11").unwrap(),
            version: SequenceNumber(2),
        };
        assert!(deleted.object_ref().is_none());
        assert_eq!(deleted.kind(), "deleted");
    }

    #[test]
    fn test_report_json_shape() {
        let report = TransactionEffectsReport::new(
            Digest::from_bytes(b"tx"),
            ExecutionStatus::Success,
            vec![created("0x10", "0x2::package::Publisher")],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"]["status"], "success");
        assert_eq!(json["objectChanges"][0]["type"], "created");
        assert_eq!(json["objectChanges"][0]["objectType"], "0x2::package::Publisher");

        let back: TransactionEffectsReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_failure_status_display() {
        let status = ExecutionStatus::Failure {
            error: "InsufficientGas".to_string(),
        };
        assert!(!status.is_success());
        assert_eq!(status.to_string(), "failure: InsufficientGas");
    }
}
