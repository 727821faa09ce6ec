//! Canonical ledger encoding of transactions.
//!
//! The ledger signs and hashes the BCS encoding of its own transaction
//! layout. Several of its enums have variants this crate never builds
//! (coin splits, shared object inputs, expiry epochs), so the plain serde
//! derives would number variants differently. [`Wire`] serializes the
//! crate's types with the ledger's variant indices and field order.
//!
//! ```text
//! TransactionData::V1 {
//!     kind: TransactionKind::ProgrammableTransaction { inputs, commands },
//!     sender,
//!     gas_data: { payment, owner, price, budget },
//!     expiration: TransactionExpiration::None,
//! }
//! ```

use crate::{
    CallArg, Command, MoveCall, ObjectRef, ProgrammableTransaction, StructTag, SuiAddress,
    TransactionData, TypeTag,
};
use serde::ser::{SerializeStruct, SerializeTupleVariant};
use serde::{Serialize, Serializer};

/// Borrowed value serialized in the ledger's layout.
pub(crate) struct Wire<'a, T>(pub &'a T);

/// Slice serialized element by element through [`Wire`].
struct Seq<'a, T>(&'a [T]);

impl<'a, T> Serialize for Seq<'a, T>
where
    for<'b> Wire<'b, T>: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Wire))
    }
}

#[derive(Serialize)]
struct GasData<'a> {
    payment: &'a [ObjectRef],
    owner: SuiAddress,
    price: u64,
    budget: u64,
}

struct Expiration;

impl Serialize for Expiration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit_variant("TransactionExpiration", 0, "None")
    }
}

struct ImmOrOwnedObject<'a>(&'a ObjectRef);

impl Serialize for ImmOrOwnedObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_variant("ObjectArg", 0, "ImmOrOwnedObject", self.0)
    }
}

struct TransactionDataV1<'a>(&'a TransactionData);

impl Serialize for TransactionDataV1<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self.0;
        let mut state = serializer.serialize_struct("TransactionDataV1", 4)?;
        state.serialize_field("kind", &Wire(&data.kind))?;
        state.serialize_field("sender", &data.sender)?;
        state.serialize_field(
            "gas_data",
            &GasData {
                payment: &data.gas_payment,
                owner: data.sender,
                price: data.gas_price,
                budget: data.gas_budget,
            },
        )?;
        state.serialize_field("expiration", &Expiration)?;
        state.end()
    }
}

impl Serialize for Wire<'_, TransactionData> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_variant("TransactionData", 0, "V1", &TransactionDataV1(self.0))
    }
}

struct Programmable<'a>(&'a ProgrammableTransaction);

impl Serialize for Programmable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProgrammableTransaction", 2)?;
        state.serialize_field("inputs", &Seq(&self.0.inputs))?;
        state.serialize_field("commands", &Seq(&self.0.commands))?;
        state.end()
    }
}

impl Serialize for Wire<'_, ProgrammableTransaction> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_variant(
            "TransactionKind",
            0,
            "ProgrammableTransaction",
            &Programmable(self.0),
        )
    }
}

impl Serialize for Wire<'_, CallArg> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            CallArg::Pure(bytes) => serializer.serialize_newtype_variant("CallArg", 0, "Pure", bytes),
            CallArg::Object(object) => serializer.serialize_newtype_variant(
                "CallArg",
                1,
                "Object",
                &ImmOrOwnedObject(object),
            ),
        }
    }
}

impl Serialize for Wire<'_, Command> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Command::MoveCall(call) => {
                serializer.serialize_newtype_variant("Command", 0, "MoveCall", &Wire(&**call))
            }
            Command::TransferObjects(objects, recipient) => {
                let mut state =
                    serializer.serialize_tuple_variant("Command", 1, "TransferObjects", 2)?;
                state.serialize_field(objects)?;
                state.serialize_field(recipient)?;
                state.end()
            }
            Command::Publish(modules, dependencies) => {
                let mut state = serializer.serialize_tuple_variant("Command", 4, "Publish", 2)?;
                state.serialize_field(modules)?;
                state.serialize_field(dependencies)?;
                state.end()
            }
        }
    }
}

impl Serialize for Wire<'_, MoveCall> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let call = self.0;
        let mut state = serializer.serialize_struct("ProgrammableMoveCall", 5)?;
        state.serialize_field("package", &call.package)?;
        state.serialize_field("module", &call.module)?;
        state.serialize_field("function", &call.function)?;
        state.serialize_field("type_arguments", &Seq(&call.type_arguments))?;
        state.serialize_field("arguments", &call.arguments)?;
        state.end()
    }
}

impl Serialize for Wire<'_, TypeTag> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const NAME: &str = "TypeTag";
        match self.0 {
            TypeTag::Bool => serializer.serialize_unit_variant(NAME, 0, "bool"),
            TypeTag::U8 => serializer.serialize_unit_variant(NAME, 1, "u8"),
            TypeTag::U64 => serializer.serialize_unit_variant(NAME, 2, "u64"),
            TypeTag::U128 => serializer.serialize_unit_variant(NAME, 3, "u128"),
            TypeTag::Address => serializer.serialize_unit_variant(NAME, 4, "address"),
            TypeTag::Signer => serializer.serialize_unit_variant(NAME, 5, "signer"),
            TypeTag::Vector(inner) => {
                serializer.serialize_newtype_variant(NAME, 6, "vector", &Wire(&**inner))
            }
            TypeTag::Struct(tag) => {
                serializer.serialize_newtype_variant(NAME, 7, "struct", &Wire(&**tag))
            }
            TypeTag::U16 => serializer.serialize_unit_variant(NAME, 8, "u16"),
            TypeTag::U32 => serializer.serialize_unit_variant(NAME, 9, "u32"),
            TypeTag::U256 => serializer.serialize_unit_variant(NAME, 10, "u256"),
        }
    }
}

impl Serialize for Wire<'_, StructTag> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.0;
        let mut state = serializer.serialize_struct("StructTag", 4)?;
        state.serialize_field("address", &tag.address)?;
        state.serialize_field("module", &tag.module)?;
        state.serialize_field("name", &tag.name)?;
        state.serialize_field("type_params", &Seq(&tag.type_params))?;
        state.end()
    }
}
