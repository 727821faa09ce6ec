//! Effects parsing.
//!
//! Pure functions that pull typed identifiers out of a transaction's reported
//! object changes. Matching is by exact structural type equality.
//!
//! ```text
//! TransactionEffectsReport
//!   published  ──► find_published_package
//!   created    ──► find_created_object_of_type / find_created_ref_of_type
//!   mutated    ──► is_mutated
//! ```

mod created;
mod parser;
mod well_known;

pub use created::{parse_created_object_ids, CreatedObjectIds};
pub use parser::{
    created_objects_of_type, find_created_object_of_type, find_created_ref_of_type,
    find_published_package, is_mutated, published_package_count,
};
pub use well_known::{
    hero_type, publisher_type, sword_type, transfer_policy_cap_type, transfer_policy_type,
    upgrade_cap_type,
};
