//! HTTP transport for the ledger's JSON-RPC interface.

use super::types::{
    JsonRpcRequest, JsonRpcResponse, RpcCoinPage, RpcTransactionBlockResponse, RpcU64,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use kiosk_provisioner_core::{GasPayment, LedgerClient, LedgerError, ResponseOptions};
use kiosk_provisioner_types::{
    ObjectRef, SignedTransaction, SuiAddress, TransactionDigest, TransactionEffectsReport,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

const EXECUTE_METHOD: &str = "sui_executeTransactionBlock";
const GET_METHOD: &str = "sui_getTransactionBlock";
const COINS_METHOD: &str = "suix_getCoins";
const GAS_PRICE_METHOD: &str = "suix_getReferenceGasPrice";
const REQUEST_TYPE: &str = "WaitForLocalExecution";
const GAS_COIN_TYPE: &str = "0x2::sui::SUI";

/// Most coins one transaction may pay gas with.
const MAX_GAS_COINS: usize = 256;

/// JSON-RPC "invalid params". The node answers an unknown digest with this
/// code.
const INVALID_PARAMS: i64 = -32602;

/// Per-request HTTP timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`LedgerClient`] speaking JSON-RPC 2.0 to a full node over HTTP.
///
/// Finality is observed by polling `sui_getTransactionBlock` until the node
/// knows the digest.
pub struct JsonRpcLedgerClient {
    url: String,
    client: reqwest::Client,
    poll_interval: Duration,
    finality_timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    /// Create a client for the full node at `url`.
    pub fn new(
        url: impl Into<String>,
        poll_interval: Duration,
        finality_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
            poll_interval,
            finality_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Full node URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        trace!(method, id = request.id, "Sending JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transport(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let body: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(format!("{method}: {e}")))?;
        match (body.result, body.error) {
            (_, Some(error)) => Err(LedgerError::Rejected {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(LedgerError::MalformedResponse(format!(
                "{method}: neither result nor error"
            ))),
        }
    }
}

/// Whether an error from `sui_getTransactionBlock` means the node does not
/// know the digest yet.
fn is_not_found(code: i64, message: &str) -> bool {
    code == INVALID_PARAMS && message.contains("Could not find")
}

/// Coins taken in the node's order until their balance covers the budget.
#[derive(Debug, Default)]
struct GasSelection {
    coins: Vec<ObjectRef>,
    balance: u64,
}

impl GasSelection {
    /// Take `coin`; true once `budget` is covered.
    fn take(&mut self, coin: ObjectRef, balance: u64, budget: u64) -> bool {
        self.coins.push(coin);
        self.balance = self.balance.saturating_add(balance);
        self.balance >= budget
    }

    fn is_full(&self) -> bool {
        self.coins.len() >= MAX_GAS_COINS
    }
}

/// Positional parameters of `sui_executeTransactionBlock`.
pub(crate) fn execute_params(transaction: &SignedTransaction, options: ResponseOptions) -> Value {
    let signatures: Vec<String> = transaction
        .signatures
        .iter()
        .map(|signature| signature.to_base64())
        .collect();
    json!([
        BASE64.encode(transaction.data.to_bytes()),
        signatures,
        {
            "showEffects": options.show_effects,
            "showObjectChanges": options.show_object_changes,
        },
        REQUEST_TYPE,
    ])
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn select_gas(&self, owner: SuiAddress, budget: u64) -> Result<GasPayment, LedgerError> {
        let price = self
            .call::<RpcU64>(GAS_PRICE_METHOD, json!([]))
            .await?
            .value()?;

        let mut selection = GasSelection::default();
        let mut cursor: Option<String> = None;
        loop {
            let params = json!([owner.to_hex_literal(), GAS_COIN_TYPE, cursor, MAX_GAS_COINS]);
            let page: RpcCoinPage = self.call(COINS_METHOD, params).await?;
            for coin in page.data {
                let (coin, balance) = coin.into_gas()?;
                if selection.take(coin, balance, budget) {
                    debug!(%owner, coins = selection.coins.len(), price, "Gas coins selected");
                    return Ok(GasPayment::new(selection.coins, price));
                }
                if selection.is_full() {
                    break;
                }
            }
            match page.next_cursor {
                Some(next) if page.has_next_page && !selection.is_full() => cursor = Some(next),
                _ => break,
            }
        }

        Err(LedgerError::InsufficientGas {
            owner,
            budget,
            balance: selection.balance,
        })
    }

    async fn execute_transaction(
        &self,
        transaction: &SignedTransaction,
        options: ResponseOptions,
    ) -> Result<TransactionEffectsReport, LedgerError> {
        let response: RpcTransactionBlockResponse = self
            .call(EXECUTE_METHOD, execute_params(transaction, options))
            .await?;
        response.into_report()
    }

    async fn wait_for_finality(&self, digest: &TransactionDigest) -> Result<(), LedgerError> {
        let deadline = Instant::now() + self.finality_timeout;
        let params = json!([digest.to_base58(), { "showEffects": false }]);

        loop {
            match self.call::<Value>(GET_METHOD, params.clone()).await {
                Ok(_) => return Ok(()),
                Err(LedgerError::Rejected { code, message }) if is_not_found(code, &message) => {
                    debug!(%digest, code, %message, "Transaction not yet known");
                }
                Err(e) => return Err(e),
            }

            if Instant::now() + self.poll_interval > deadline {
                return Err(LedgerError::FinalityTimeout {
                    digest: *digest,
                    after: self.finality_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_provisioner_types::{
        Digest, KeyPair, ObjectId, ProgrammableTransaction, SequenceNumber, SignatureScheme,
        TransactionData,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Read one HTTP request, headers and body.
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Local node answering the n-th request with the n-th body (the last
    /// one repeats). Returns its URL and the requests received so far.
    async fn node(bodies: Vec<Value>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                let index = {
                    let mut seen = seen.lock();
                    seen.push(request);
                    seen.len() - 1
                };
                let body = bodies[index.min(bodies.len() - 1)].to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        (url, requests)
    }

    fn result(value: Value) -> Value {
        json!({ "jsonrpc": "2.0", "id": 1, "result": value })
    }

    fn error(code: i64, message: &str) -> Value {
        json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })
    }

    fn client(url: String) -> JsonRpcLedgerClient {
        JsonRpcLedgerClient::new(url, Duration::from_millis(10), Duration::from_secs(30)).unwrap()
    }

    fn coin(seed: u8, balance: u64) -> Value {
        json!({
            "coinType": GAS_COIN_TYPE,
            "coinObjectId": format!("0x{seed:x}"),
            "version": "3",
            "digest": Digest::from_bytes(&[seed]).to_base58(),
            "balance": balance.to_string(),
        })
    }

    fn signed() -> SignedTransaction {
        let keypair = KeyPair::from_seed(SignatureScheme::Ed25519, &[3u8; 32]);
        let data = TransactionData::new(keypair.address(), ProgrammableTransaction::default(), 10);
        let signature = keypair.sign(b"message");
        SignedTransaction::new(data, vec![signature])
    }

    #[test]
    fn test_execute_params_layout() {
        let transaction = signed();
        let params = execute_params(&transaction, ResponseOptions::full());

        let params = params.as_array().unwrap();
        assert_eq!(params.len(), 4);
        assert_eq!(
            BASE64.decode(params[0].as_str().unwrap()).unwrap(),
            transaction.data.to_bytes()
        );
        assert_eq!(
            params[1][0].as_str().unwrap(),
            transaction.signatures[0].to_base64()
        );
        assert_eq!(params[2]["showEffects"], json!(true));
        assert_eq!(params[2]["showObjectChanges"], json!(true));
        assert_eq!(params[3], json!("WaitForLocalExecution"));
    }

    #[test]
    fn test_request_envelope() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: GET_METHOD,
            params: json!(["abc"]),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "sui_getTransactionBlock",
                "params": ["abc"],
            })
        );
    }

    #[test]
    fn test_error_envelope() {
        let body: JsonRpcResponse<Value> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Could not find the referenced transaction"}}"#,
        )
        .unwrap();
        assert!(body.result.is_none());
        let error = body.error.unwrap();
        assert_eq!(error.code, -32602);
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let client = JsonRpcLedgerClient::new(
            "http://127.0.0.1:1",
            Duration::from_millis(10),
            Duration::from_millis(50),
        )
        .unwrap();

        let result = client
            .execute_transaction(&signed(), ResponseOptions::full())
            .await;

        assert!(matches!(result, Err(LedgerError::Transport(_))));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(is_not_found(
            -32602,
            "Could not find the referenced transaction [TransactionDigest(abc)]."
        ));
        assert!(!is_not_found(-32602, "Invalid params"));
        assert!(!is_not_found(-32000, "Could not find the referenced transaction"));
    }

    #[tokio::test]
    async fn test_finality_polls_while_not_found() {
        let digest = Digest::from_bytes(b"tx");
        let not_found = error(-32602, "Could not find the referenced transaction");
        let (url, requests) = node(vec![
            not_found.clone(),
            not_found,
            result(json!({ "digest": digest.to_base58() })),
        ])
        .await;

        client(url).wait_for_finality(&digest).await.unwrap();

        let requests = requests.lock();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.contains(GET_METHOD)));
    }

    #[tokio::test]
    async fn test_finality_returns_other_errors_at_once() {
        let digest = Digest::from_bytes(b"tx");
        let (url, requests) = node(vec![error(-32600, "Invalid request")]).await;

        let result = client(url).wait_for_finality(&digest).await;

        assert!(matches!(
            result,
            Err(LedgerError::Rejected { code: -32600, .. })
        ));
        assert_eq!(requests.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_select_gas_takes_coins_until_budget() {
        let owner = SuiAddress::from_hex_literal("0x7").unwrap();
        let (url, requests) = node(vec![
            result(json!("750")),
            result(json!({
                "data": [coin(1, 600), coin(2, 600), coin(3, 600)],
                "nextCursor": "0x3",
                "hasNextPage": false,
            })),
        ])
        .await;

        let gas = client(url).select_gas(owner, 1_000).await.unwrap();

        assert_eq!(gas.price, 750);
        let ids: Vec<ObjectId> = gas.coins.iter().map(|coin| coin.object_id).collect();
        assert_eq!(
            ids,
            vec![
                ObjectId::from_hex_literal("0x1").unwrap(),
                ObjectId::from_hex_literal("0x2").unwrap(),
            ]
        );
        assert_eq!(gas.coins[0].version, SequenceNumber(3));
        let requests = requests.lock();
        assert!(requests[0].contains(GAS_PRICE_METHOD));
        assert!(requests[1].contains(COINS_METHOD));
        assert!(requests[1].contains(&owner.to_hex_literal()));
    }

    #[tokio::test]
    async fn test_select_gas_follows_pages() {
        let owner = SuiAddress::from_hex_literal("0x7").unwrap();
        let (url, requests) = node(vec![
            result(json!(1000)),
            result(json!({ "data": [coin(1, 10)], "nextCursor": "0x1", "hasNextPage": true })),
            result(json!({ "data": [coin(2, 990)], "nextCursor": null, "hasNextPage": false })),
        ])
        .await;

        let gas = client(url).select_gas(owner, 1_000).await.unwrap();

        assert_eq!(gas.coins.len(), 2);
        let requests = requests.lock();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].contains("\"0x1\""));
    }

    #[tokio::test]
    async fn test_select_gas_insufficient_balance() {
        let owner = SuiAddress::from_hex_literal("0x7").unwrap();
        let (url, _) = node(vec![
            result(json!("1000")),
            result(json!({ "data": [coin(1, 10), coin(2, 20)], "hasNextPage": false })),
        ])
        .await;

        let result = client(url).select_gas(owner, 1_000).await;

        assert!(matches!(
            result,
            Err(LedgerError::InsufficientGas { budget: 1_000, balance: 30, .. })
        ));
    }
}
