//! Programmable transaction payloads.
//!
//! A programmable transaction is an ordered list of inputs plus an ordered
//! list of commands. Commands refer to inputs and to the results of earlier
//! commands through [`Argument`], which is how the second command of a
//! policy transaction consumes the objects returned by the first.
//!
//! [`TransactionData::to_bytes`] is the ledger's canonical BCS encoding;
//! signatures and digests are computed over it.

use crate::wire::Wire;
use crate::{
    transaction_digest_message, Digest, ObjectRef, PackageId, Signature, SuiAddress,
    TransactionDigest, TypeTag,
};
use serde::{Deserialize, Serialize};

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// Pre-encoded pure value (little-endian integers, raw addresses).
    Pure(Vec<u8>),
    /// An owned or immutable object, by reference.
    Object(ObjectRef),
}

/// A reference to a value inside the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    /// The gas coin.
    GasCoin,
    /// One of the transaction inputs.
    Input(u16),
    /// The whole result of an earlier command.
    Result(u16),
    /// One element of a tuple result of an earlier command.
    NestedResult(u16, u16),
}

/// Call of a Move entry or public function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: PackageId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    /// `package::module::function` for logs.
    pub fn target(&self) -> String {
        format!(
            "{}::{}::{}",
            self.package.to_short_literal(),
            self.module,
            self.function
        )
    }
}

/// One step of a programmable transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Call a Move function.
    MoveCall(Box<MoveCall>),
    /// Transfer objects to an address (the address argument).
    TransferObjects(Vec<Argument>, Argument),
    /// Publish module bytecode with the given dependencies.
    /// Returns the upgrade capability.
    Publish(Vec<Vec<u8>>, Vec<PackageId>),
}

impl Command {
    /// Short name of the command kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::MoveCall(_) => "move_call",
            Command::TransferObjects(..) => "transfer_objects",
            Command::Publish(..) => "publish",
        }
    }
}

/// Inputs and commands of a programmable transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

/// Complete unsigned transaction.
///
/// Gas is paid by the sender. `gas_payment` and `gas_price` start empty and
/// are filled from the ledger right before signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub sender: SuiAddress,
    pub kind: ProgrammableTransaction,
    pub gas_budget: u64,
    /// Coins owned by the sender that pay for gas.
    pub gas_payment: Vec<ObjectRef>,
    pub gas_price: u64,
}

impl TransactionData {
    /// Create a new transaction without gas payment.
    pub fn new(sender: SuiAddress, kind: ProgrammableTransaction, gas_budget: u64) -> Self {
        Self {
            sender,
            kind,
            gas_budget,
            gas_payment: Vec::new(),
            gas_price: 0,
        }
    }

    /// Pay gas with `payment` at `price` per unit.
    pub fn with_gas(mut self, payment: Vec<ObjectRef>, price: u64) -> Self {
        self.gas_payment = payment;
        self.gas_price = price;
        self
    }

    /// Whether gas coins and a price are set.
    pub fn has_gas(&self) -> bool {
        !self.gas_payment.is_empty() && self.gas_price > 0
    }

    /// Canonical BCS encoding, used for signing and for the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        bcs::to_bytes(&Wire(self)).expect("TransactionData serialization should never fail")
    }

    /// Compute the transaction digest.
    pub fn digest(&self) -> TransactionDigest {
        Digest::from_bytes(&transaction_digest_message(&self.to_bytes()))
    }

    /// Commands of the transaction.
    pub fn commands(&self) -> &[Command] {
        &self.kind.commands
    }
}

/// A transaction together with the signatures authorizing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub data: TransactionData,
    pub signatures: Vec<Signature>,
}

impl SignedTransaction {
    /// Create a signed transaction.
    pub fn new(data: TransactionData, signatures: Vec<Signature>) -> Self {
        Self { data, signatures }
    }

    /// Digest of the underlying transaction.
    pub fn digest(&self) -> TransactionDigest {
        self.data.digest()
    }
}
