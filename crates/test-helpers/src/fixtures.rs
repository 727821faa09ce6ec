//! Deterministic fixtures.

use kiosk_provisioner_types::{
    BuildArtifact, Digest, KeyPair, ObjectId, ObjectRef, PackageId, SequenceNumber,
    SignatureScheme, SuiAddress,
};

/// Gas price [`FakeLedger`](crate::FakeLedger) quotes.
pub const REFERENCE_GAS_PRICE: u64 = 1_000;

/// Seed of [`admin_keypair`].
pub const ADMIN_SEED: [u8; 32] = [42u8; 32];

/// The admin key every fixture transaction is sent from.
pub fn admin_keypair() -> KeyPair {
    KeyPair::from_seed(SignatureScheme::Ed25519, &ADMIN_SEED)
}

/// Artifact of the sword package. Module bytecode is the module name, which
/// [`FakeLedger`](crate::FakeLedger) reports back as the module list.
pub fn sword_artifact() -> BuildArtifact {
    BuildArtifact::new(
        vec![b"sword".to_vec(), b"hero".to_vec(), b"blacksmith".to_vec()],
        vec![PackageId::MOVE_STDLIB, PackageId::SUI_FRAMEWORK],
    )
}

/// Artifact of the kiosk rules package.
pub fn rules_artifact() -> BuildArtifact {
    BuildArtifact::new(
        vec![
            b"royalty_rule".to_vec(),
            b"kiosk_lock_rule".to_vec(),
            b"personal_kiosk_rule".to_vec(),
        ],
        vec![PackageId::MOVE_STDLIB, PackageId::SUI_FRAMEWORK],
    )
}

/// A well-formed object reference derived from `seed`.
pub fn object_ref(seed: u8) -> ObjectRef {
    let mut id = [0u8; 32];
    id[31] = seed;
    id[0] = 0x0b;
    ObjectRef::new(
        ObjectId::new(id),
        SequenceNumber(1),
        Digest::from_bytes(&[seed]),
    )
}

/// The gas coin [`FakeLedger`](crate::FakeLedger) hands out for `owner`.
pub fn gas_coin(owner: SuiAddress) -> ObjectRef {
    let id = Digest::from_parts(&[b"gas".as_slice(), owner.as_bytes().as_slice()]);
    ObjectRef::new(
        ObjectId::new(*id.as_bytes()),
        SequenceNumber(1),
        Digest::from_parts(&[b"gas coin".as_slice(), owner.as_bytes().as_slice()]),
    )
}
