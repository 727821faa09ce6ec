//! Game objects created by mint transactions.

use crate::parser::created_objects_of_type;
use crate::well_known::{hero_type, sword_type};
use kiosk_provisioner_types::{ObjectChange, ObjectId, PackageId};

/// Ids of heroes and swords created by one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedObjectIds {
    /// Objects of type `package::hero::Hero`.
    pub hero_ids: Vec<ObjectId>,
    /// Objects of type `package::blacksmith::Sword`.
    pub sword_ids: Vec<ObjectId>,
}

impl CreatedObjectIds {
    /// Whether neither kind was created.
    pub fn is_empty(&self) -> bool {
        self.hero_ids.is_empty() && self.sword_ids.is_empty()
    }
}

/// Sort created heroes and swords of `package_id` into their own lists.
pub fn parse_created_object_ids(changes: &[ObjectChange], package_id: PackageId) -> CreatedObjectIds {
    CreatedObjectIds {
        hero_ids: created_objects_of_type(changes, &hero_type(package_id)),
        sword_ids: created_objects_of_type(changes, &sword_type(package_id)),
    }
}
