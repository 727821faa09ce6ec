//! JSON-RPC ledger client.

mod client;
mod types;

pub use client::JsonRpcLedgerClient;
pub use types::{
    JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse, RpcCoin, RpcCoinPage, RpcEffects,
    RpcExecutionStatus, RpcObjectChange, RpcOwner, RpcTransactionBlockResponse, RpcU64,
};
