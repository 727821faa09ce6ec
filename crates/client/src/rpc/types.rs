//! Types for JSON-RPC communication with a full node.

use kiosk_provisioner_core::LedgerError;
use kiosk_provisioner_types::{
    Digest, ExecutionStatus, ObjectChange, ObjectId, ObjectRef, Owner, PackageId, SequenceNumber,
    StructTag, SuiAddress, TransactionEffectsReport,
};
use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcErrorObject>,
}

/// Error member of a JSON-RPC response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Integers the node sends either as JSON numbers or as decimal strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RpcU64 {
    Number(u64),
    Text(String),
}

impl RpcU64 {
    pub(crate) fn value(&self) -> Result<u64, LedgerError> {
        match self {
            RpcU64::Number(n) => Ok(*n),
            RpcU64::Text(s) => s
                .parse()
                .map_err(|_| malformed(format!("not an integer: {s:?}"))),
        }
    }

    fn version(&self) -> Result<SequenceNumber, LedgerError> {
        self.value().map(SequenceNumber)
    }
}

/// One coin of a `suix_getCoins` page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcCoin {
    pub coin_object_id: String,
    pub version: RpcU64,
    pub digest: String,
    pub balance: RpcU64,
}

impl RpcCoin {
    /// Reference and balance of the coin.
    pub fn into_gas(self) -> Result<(ObjectRef, u64), LedgerError> {
        let object = ObjectRef::new(
            object_id(&self.coin_object_id)?,
            self.version.version()?,
            digest(&self.digest)?,
        );
        Ok((object, self.balance.value()?))
    }
}

/// Response of `suix_getCoins`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcCoinPage {
    pub data: Vec<RpcCoin>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Response of `sui_executeTransactionBlock` and `sui_getTransactionBlock`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionBlockResponse {
    pub digest: String,
    #[serde(default)]
    pub effects: Option<RpcEffects>,
    #[serde(default)]
    pub object_changes: Option<Vec<RpcObjectChange>>,
}

#[derive(Debug, Deserialize)]
pub struct RpcEffects {
    pub status: RpcExecutionStatus,
}

#[derive(Debug, Deserialize)]
pub struct RpcExecutionStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Object owner as rendered by the node.
#[derive(Debug, Clone, Deserialize)]
pub enum RpcOwner {
    AddressOwner(String),
    ObjectOwner(String),
    Shared { initial_shared_version: RpcU64 },
    Immutable,
}

/// One object change as rendered by the node.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RpcObjectChange {
    Published {
        package_id: String,
        version: RpcU64,
        digest: String,
        modules: Vec<String>,
    },
    Created {
        object_id: String,
        object_type: String,
        owner: RpcOwner,
        version: RpcU64,
        digest: String,
    },
    Mutated {
        object_id: String,
        object_type: String,
        owner: RpcOwner,
        version: RpcU64,
        digest: String,
    },
    Transferred {
        object_id: String,
        object_type: String,
        recipient: RpcOwner,
        version: RpcU64,
        digest: String,
    },
    Deleted {
        object_id: String,
        version: RpcU64,
    },
    Wrapped {
        object_id: String,
        version: RpcU64,
    },
    #[serde(other)]
    Unknown,
}

fn malformed(message: impl Into<String>) -> LedgerError {
    LedgerError::MalformedResponse(message.into())
}

fn object_id(literal: &str) -> Result<ObjectId, LedgerError> {
    ObjectId::from_hex_literal(literal).map_err(|e| malformed(format!("object id {literal}: {e}")))
}

fn digest(encoded: &str) -> Result<Digest, LedgerError> {
    Digest::from_base58(encoded).map_err(|e| malformed(format!("digest {encoded}: {e}")))
}

fn struct_tag(rendered: &str) -> Result<StructTag, LedgerError> {
    rendered
        .parse()
        .map_err(|e| malformed(format!("object type {rendered}: {e}")))
}

impl RpcOwner {
    fn into_owner(self) -> Result<Owner, LedgerError> {
        Ok(match self {
            RpcOwner::AddressOwner(address) => Owner::AddressOwner(
                SuiAddress::from_hex_literal(&address)
                    .map_err(|e| malformed(format!("owner {address}: {e}")))?,
            ),
            RpcOwner::ObjectOwner(id) => Owner::ObjectOwner(object_id(&id)?),
            RpcOwner::Shared {
                initial_shared_version,
            } => Owner::Shared {
                initial_shared_version: initial_shared_version.version()?,
            },
            RpcOwner::Immutable => Owner::Immutable,
        })
    }
}

impl RpcObjectChange {
    /// Map onto the four report kinds.
    ///
    /// `transferred` becomes `mutated` with the recipient as owner, `wrapped`
    /// becomes `deleted`. Unknown kinds are rejected.
    pub fn into_change(self) -> Result<ObjectChange, LedgerError> {
        Ok(match self {
            RpcObjectChange::Published {
                package_id,
                version,
                digest: d,
                modules,
            } => ObjectChange::Published {
                package_id: PackageId::from_hex_literal(&package_id)
                    .map_err(|e| malformed(format!("package id {package_id}: {e}")))?,
                version: version.version()?,
                digest: digest(&d)?,
                modules,
            },
            RpcObjectChange::Created {
                object_id: id,
                object_type,
                owner,
                version,
                digest: d,
            } => ObjectChange::Created {
                object_id: object_id(&id)?,
                object_type: struct_tag(&object_type)?,
                owner: owner.into_owner()?,
                version: version.version()?,
                digest: digest(&d)?,
            },
            RpcObjectChange::Mutated {
                object_id: id,
                object_type,
                owner,
                version,
                digest: d,
            }
            | RpcObjectChange::Transferred {
                object_id: id,
                object_type,
                recipient: owner,
                version,
                digest: d,
            } => ObjectChange::Mutated {
                object_id: object_id(&id)?,
                object_type: struct_tag(&object_type)?,
                owner: owner.into_owner()?,
                version: version.version()?,
                digest: digest(&d)?,
            },
            RpcObjectChange::Deleted { object_id: id, version }
            | RpcObjectChange::Wrapped { object_id: id, version } => ObjectChange::Deleted {
                object_id: object_id(&id)?,
                version: version.version()?,
            },
            RpcObjectChange::Unknown => return Err(malformed("unknown object change kind")),
        })
    }
}

impl RpcTransactionBlockResponse {
    /// Convert into an effects report.
    pub fn into_report(self) -> Result<TransactionEffectsReport, LedgerError> {
        let effects = self
            .effects
            .ok_or_else(|| malformed("response carries no effects"))?;
        let status = match effects.status.status.as_str() {
            "success" => ExecutionStatus::Success,
            "failure" => ExecutionStatus::Failure {
                error: effects
                    .status
                    .error
                    .unwrap_or_else(|| "unspecified failure".to_string()),
            },
            other => return Err(malformed(format!("unknown execution status {other:?}"))),
        };
        let changes = self
            .object_changes
            .unwrap_or_default()
            .into_iter()
            .map(RpcObjectChange::into_change)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TransactionEffectsReport::new(
            digest(&self.digest)?,
            status,
            changes,
        ))
    }
}
