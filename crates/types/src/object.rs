//! Object references and ownership.

use crate::{ObjectDigest, ObjectId, SequenceNumber, SuiAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to one version of an object, as used for transaction inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(object_id: ObjectId, version: SequenceNumber, digest: ObjectDigest) -> Self {
        Self {
            object_id,
            version,
            digest,
        }
    }

    /// Whether every component is populated.
    ///
    /// A live object never has a zero id, version zero, or an all-zero digest.
    pub fn is_well_formed(&self) -> bool {
        !self.object_id.is_zero() && self.version != SequenceNumber::ZERO && !self.digest.is_zero()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.object_id.to_short_literal(), self.version)
    }
}

/// Who owns an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Owned by an account address.
    AddressOwner(SuiAddress),
    /// Owned by another object.
    ObjectOwner(ObjectId),
    /// Shared, usable by any transaction.
    Shared {
        initial_shared_version: SequenceNumber,
    },
    /// Frozen.
    Immutable,
}

impl Owner {
    /// Whether the object is owned by `address`.
    pub fn is_address_owned_by(&self, address: &SuiAddress) -> bool {
        matches!(self, Owner::AddressOwner(owner) if owner == address)
    }

    /// Whether the object is shared.
    pub fn is_shared(&self) -> bool {
        matches!(self, Owner::Shared { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Digest;

    #[test]
    fn test_object_ref_well_formed() {
        let id = ObjectId::from_hex_literal("0x5").unwrap();
        let good = ObjectRef::new(id, SequenceNumber(3), Digest::from_bytes(b"obj"));
        assert!(good.is_well_formed());

        let zero_version = ObjectRef::new(id, SequenceNumber::ZERO, Digest::from_bytes(b"obj"));
        assert!(!zero_version.is_well_formed());

        let zero_digest = ObjectRef::new(id, SequenceNumber(3), Digest::ZERO);
        assert!(!zero_digest.is_well_formed());

        let zero_id = ObjectRef::new(ObjectId::ZERO, SequenceNumber(3), Digest::from_bytes(b"obj"));
        assert!(!zero_id.is_well_formed());
    }

    #[test]
    fn test_owner_predicates() {
        let alice = SuiAddress::from_hex_literal("0xa11ce").unwrap();
        let bob = SuiAddress::from_hex_literal("0xb0b").unwrap();
        let owner = Owner::AddressOwner(alice);
        assert!(owner.is_address_owned_by(&alice));
        assert!(!owner.is_address_owned_by(&bob));
        assert!(!owner.is_shared());
        assert!(Owner::Shared {
            initial_shared_version: SequenceNumber(1)
        }
        .is_shared());
    }
}
