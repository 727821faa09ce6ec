//! Lookups over reported object changes.
//!
//! Every function is total: a missing entity is `None` or an empty list,
//! never an error. The caller decides whether absence is fatal.

use kiosk_provisioner_types::{
    ObjectChange, ObjectId, ObjectRef, PackageId, StructTag, TransactionEffectsReport,
};

fn published_id(change: &ObjectChange) -> Option<PackageId> {
    match change {
        ObjectChange::Published { package_id, .. } => Some(*package_id),
        ObjectChange::Created { .. }
        | ObjectChange::Mutated { .. }
        | ObjectChange::Deleted { .. } => None,
    }
}

fn created_ref(change: &ObjectChange, wanted: &StructTag) -> Option<ObjectRef> {
    match change {
        ObjectChange::Created {
            object_id,
            object_type,
            version,
            digest,
            ..
        } if object_type == wanted => Some(ObjectRef::new(*object_id, *version, *digest)),
        ObjectChange::Created { .. }
        | ObjectChange::Published { .. }
        | ObjectChange::Mutated { .. }
        | ObjectChange::Deleted { .. } => None,
    }
}

/// Package id from the first `published` change.
///
/// At most one is expected per transaction. When there are more, the first
/// wins; use [`published_package_count`] to surface the ambiguity.
pub fn find_published_package(report: &TransactionEffectsReport) -> Option<PackageId> {
    report.changes().iter().find_map(published_id)
}

/// Number of `published` changes in the report.
pub fn published_package_count(report: &TransactionEffectsReport) -> usize {
    report
        .changes()
        .iter()
        .filter_map(published_id)
        .count()
}

/// Id of the first object created with exactly type `object_type`.
pub fn find_created_object_of_type(
    report: &TransactionEffectsReport,
    object_type: &StructTag,
) -> Option<ObjectId> {
    find_created_ref_of_type(report, object_type).map(|object_ref| object_ref.object_id)
}

/// Like [`find_created_object_of_type`], returning a full object reference.
pub fn find_created_ref_of_type(
    report: &TransactionEffectsReport,
    object_type: &StructTag,
) -> Option<ObjectRef> {
    report
        .changes()
        .iter()
        .find_map(|change| created_ref(change, object_type))
}

/// Ids of every object created with exactly type `object_type`, in report order.
pub fn created_objects_of_type(changes: &[ObjectChange], object_type: &StructTag) -> Vec<ObjectId> {
    changes
        .iter()
        .filter_map(|change| created_ref(change, object_type))
        .map(|object_ref| object_ref.object_id)
        .collect()
}

/// Whether the report lists `object_id` as mutated.
pub fn is_mutated(report: &TransactionEffectsReport, object_id: ObjectId) -> bool {
    report.changes().iter().any(|change| match change {
        ObjectChange::Mutated { object_id: id, .. } => *id == object_id,
        ObjectChange::Published { .. }
        | ObjectChange::Created { .. }
        | ObjectChange::Deleted { .. } => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::well_known::publisher_type;
    use kiosk_provisioner_types::{Digest, ExecutionStatus, Owner, SequenceNumber, SuiAddress};

    fn id(literal: &str) -> ObjectId {
        ObjectId::from_hex_literal(literal).unwrap()
    }

    fn created(object: &str, ty: &str) -> ObjectChange {
        ObjectChange::Created {
            object_id: id(object),
            object_type: ty.parse().unwrap(),
            owner: Owner::AddressOwner(SuiAddress::from_hex_literal("0xa").unwrap()),
            version: SequenceNumber(1),
            digest: Digest::from_bytes(object.as_bytes()),
        }
    }

    fn published(package: &str) -> ObjectChange {
        ObjectChange::Published {
            package_id: PackageId::from_hex_literal(package).unwrap(),
            version: SequenceNumber(1),
            digest: Digest::from_bytes(package.as_bytes()),
            modules: vec!["sword".to_string()],
        }
    }

    fn report(changes: Vec<ObjectChange>) -> TransactionEffectsReport {
        TransactionEffectsReport::new(Digest::from_bytes(b"tx"), ExecutionStatus::Success, changes)
    }

    #[test]
    fn test_type_tag_exactness() {
        let report = report(vec![
            created("0x1a", "0x2::package::Publisher"),
            created("0x1b", "0x2::other::Publisher"),
        ]);
        assert_eq!(
            find_created_object_of_type(&report, &publisher_type()),
            Some(id("0x1a"))
        );
        assert_eq!(
            created_objects_of_type(report.changes(), &publisher_type()),
            vec![id("0x1a")]
        );
    }

    #[test]
    fn test_no_prefix_matching() {
        let report = report(vec![created(
            "0x1a",
            "0x2::transfer_policy::TransferPolicyCap<0xabc::sword::Sword>",
        )]);
        let policy: StructTag = "0x2::transfer_policy::TransferPolicy<0xabc::sword::Sword>"
            .parse()
            .unwrap();
        assert_eq!(find_created_object_of_type(&report, &policy), None);
    }

    #[test]
    fn test_published_package_absent() {
        let report = report(vec![created("0x1a", "0x2::package::Publisher")]);
        assert_eq!(find_published_package(&report), None);
        assert_eq!(published_package_count(&report), 0);
    }

    #[test]
    fn test_first_published_package_wins() {
        let report = report(vec![published("0xaa"), published("0xbb")]);
        assert_eq!(
            find_published_package(&report),
            Some(PackageId::from_hex_literal("0xaa").unwrap())
        );
        assert_eq!(published_package_count(&report), 2);
    }

    #[test]
    fn test_mutated_and_deleted_are_not_created() {
        let ty: StructTag = "0x2::package::Publisher".parse().unwrap();
        let report = report(vec![
            ObjectChange::Mutated {
                object_id: id("0x1a"),
                object_type: ty.clone(),
                owner: Owner::Immutable,
                version: SequenceNumber(2),
                digest: Digest::from_bytes(b"m"),
            },
            ObjectChange::Deleted {
                object_id: id("0x1b"),
                version: SequenceNumber(2),
            },
        ]);
        assert_eq!(find_created_object_of_type(&report, &ty), None);
        assert!(is_mutated(&report, id("0x1a")));
        assert!(!is_mutated(&report, id("0x1b")));
    }

    #[test]
    fn test_created_ref_carries_version_and_digest() {
        let report = report(vec![created("0x1a", "0x2::package::Publisher")]);
        let object_ref = find_created_ref_of_type(&report, &publisher_type()).unwrap();
        assert_eq!(object_ref.version, SequenceNumber(1));
        assert_eq!(object_ref.digest, Digest::from_bytes(b"0x1a"));
    }
}
