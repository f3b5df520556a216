//! End-to-end tests through the dispatcher: JSON params in, JSON reply
//! out, with in-memory node and explorer collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use k256::ecdsa::SigningKey;
use serde_json::{json, Value};
use wallet_account::client::{
    AddressTx, ClientError, EthClient, EthDataClient, HistoryKind, RpcBlock, RpcHeader, RpcReceipt,
    RpcTransaction,
};
use wallet_account::dispatcher::{DispatchError, Dispatcher};
use wallet_account::ethereum::EthereumAdaptor;
use wallet_account::registry::ChainRegistry;
use wallet_account::server::process_line;

const SENDER: &str = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";
const RECIPIENT: &str = "0x2b5ad5c4795c026514f8317c7a215e218dccd6cf";
const TOKEN: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

// ─── Collaborator doubles ──────────────────────────────────────────

#[derive(Default)]
struct Node {
    calls: AtomicUsize,
    broadcast: Mutex<Vec<Vec<u8>>>,
    panic_on_fee: bool,
}

impl Node {
    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EthClient for Node {
    async fn block_by_number(&self, _n: Option<u64>) -> Result<RpcBlock, ClientError> {
        self.touch();
        Err(ClientError::NotFound("block".into()))
    }
    async fn block_by_hash(&self, _h: B256) -> Result<RpcBlock, ClientError> {
        self.touch();
        Err(ClientError::NotFound("block".into()))
    }
    async fn header_by_number(&self, _n: Option<u64>) -> Result<RpcHeader, ClientError> {
        self.touch();
        Err(ClientError::NotFound("header".into()))
    }
    async fn header_by_hash(&self, _h: B256) -> Result<RpcHeader, ClientError> {
        self.touch();
        Err(ClientError::NotFound("header".into()))
    }
    async fn headers_by_range(&self, _s: u64, _e: u64) -> Result<Vec<RpcHeader>, ClientError> {
        self.touch();
        Ok(Vec::new())
    }
    async fn code_at(&self, _a: Address) -> Result<Bytes, ClientError> {
        self.touch();
        Ok(Bytes::new())
    }
    async fn transaction_count(&self, _a: Address) -> Result<u64, ClientError> {
        self.touch();
        Ok(5)
    }
    async fn transaction_by_hash(&self, _h: B256) -> Result<RpcTransaction, ClientError> {
        self.touch();
        Err(ClientError::NotFound("transaction".into()))
    }
    async fn receipt_by_hash(&self, _h: B256) -> Result<RpcReceipt, ClientError> {
        self.touch();
        Err(ClientError::NotFound("receipt".into()))
    }
    async fn gas_price(&self) -> Result<U256, ClientError> {
        self.touch();
        if self.panic_on_fee {
            panic!("gas oracle returned nothing");
        }
        Ok(U256::from(30_000_000_000u64))
    }
    async fn gas_tip_cap(&self) -> Result<U256, ClientError> {
        self.touch();
        Ok(U256::from(1_000_000_000u64))
    }
    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<B256, ClientError> {
        self.touch();
        self.broadcast.lock().unwrap().push(raw_tx.to_vec());
        Ok(keccak256(raw_tx))
    }
}

#[derive(Default)]
struct Explorer {
    calls: AtomicUsize,
}

#[async_trait]
impl EthDataClient for Explorer {
    async fn transactions_by_address(
        &self,
        _address: &str,
        _page: u32,
        _page_size: u32,
        _kind: &HistoryKind,
    ) -> Result<Vec<AddressTx>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn balance(
        &self,
        _address: &str,
        _contract: Option<&str>,
    ) -> Result<Option<U256>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(U256::from(1_500_000_000_000_000_000u64)))
    }
}

struct Harness {
    dispatcher: Dispatcher,
    node: Arc<Node>,
    explorer: Arc<Explorer>,
}

fn harness(node: Node) -> Harness {
    let node = Arc::new(node);
    let explorer = Arc::new(Explorer::default());

    let mut registry = ChainRegistry::empty();
    registry.register(EthereumAdaptor::new(node.clone(), explorer.clone()));

    Harness {
        dispatcher: Dispatcher::new(registry),
        node,
        explorer,
    }
}

fn key(last_byte: u8) -> SigningKey {
    let mut privkey = [0u8; 32];
    privkey[31] = last_byte;
    SigningKey::from_bytes((&privkey).into()).unwrap()
}

fn sign(key: &SigningKey, sign_hash: &Value) -> String {
    let hash: B256 = sign_hash.as_str().unwrap().parse().unwrap();
    let (sig, recid) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();
    let mut raw = sig.to_bytes().to_vec();
    raw.push(recid.to_byte());
    format!("0x{}", hex::encode(raw))
}

/// The wire form clients send: numbers as strings except nonce/gasLimit.
fn wire_request(contract: &str) -> String {
    let doc = json!({
        "chainId": "1",
        "fromAddress": SENDER,
        "toAddress": RECIPIENT,
        "contractAddress": contract,
        "amount": "1000000000000000000",
        "nonce": 5,
        "gasLimit": 21000,
        "maxFeePerGas": "30000000000",
        "maxPriorityFeePerGas": "1000000000"
    });
    STANDARD.encode(doc.to_string())
}

async fn call(h: &Harness, method: &str, params: Value) -> Value {
    h.dispatcher.handle(method, params).await.unwrap()
}

// ─── Pipelines ─────────────────────────────────────────────────────

#[tokio::test]
async fn native_transfer_unsigned_signed_broadcast() {
    let h = harness(Node::default());
    let base64_tx = wire_request("");

    let unsigned = call(
        &h,
        "createUnSignTransaction",
        json!({"chain": "Ethereum", "base64Tx": base64_tx}),
    )
    .await;
    assert_eq!(unsigned["code"], "SUCCESS");
    let un_sign_tx = unsigned["unSignTx"].as_str().unwrap();
    assert!(un_sign_tx.starts_with("0x02"));
    assert_eq!(
        unsigned["signHash"].as_str().unwrap(),
        format!("{:#x}", keccak256(hex::decode(&un_sign_tx[2..]).unwrap()))
    );

    let signature = sign(&key(1), &unsigned["signHash"]);
    let signed = call(
        &h,
        "buildSignedTransaction",
        json!({"chain": "Ethereum", "base64Tx": base64_tx, "signature": signature}),
    )
    .await;
    assert_eq!(signed["code"], "SUCCESS");
    assert_eq!(signed["msg"], signed["txHash"]);

    let sent = call(
        &h,
        "sendTx",
        json!({"chain": "Ethereum", "rawTx": signed["signedTx"]}),
    )
    .await;
    assert_eq!(sent["code"], "SUCCESS");
    assert_eq!(sent["txHash"], signed["txHash"]);

    let broadcast = h.node.broadcast.lock().unwrap();
    assert_eq!(broadcast.len(), 1);
    assert_eq!(broadcast[0][0], 0x02);
}

#[tokio::test]
async fn token_transfer_targets_contract_with_call_data() {
    let h = harness(Node::default());

    let unsigned = call(
        &h,
        "createUnSignTransaction",
        json!({"chain": "Ethereum", "base64Tx": wire_request(TOKEN)}),
    )
    .await;
    let encoded = unsigned["unSignTx"].as_str().unwrap();

    assert!(encoded.contains(&TOKEN[2..]));
    let call_data = format!(
        "a9059cbb000000000000000000000000{}{:064x}",
        &RECIPIENT[2..],
        1_000_000_000_000_000_000u64
    );
    assert!(encoded.contains(&call_data));
}

#[tokio::test]
async fn unsigned_output_is_stable_across_calls() {
    let h = harness(Node::default());
    let params = json!({"chain": "Ethereum", "base64Tx": wire_request("0x00")});

    let first = call(&h, "createUnSignTransaction", params.clone()).await;
    let second = call(&h, "createUnSignTransaction", params).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn spoofed_sender_never_yields_a_transaction() {
    let h = harness(Node::default());
    let base64_tx = wire_request("");

    let unsigned = call(
        &h,
        "createUnSignTransaction",
        json!({"chain": "Ethereum", "base64Tx": base64_tx}),
    )
    .await;
    let signature = sign(&key(7), &unsigned["signHash"]);

    let signed = call(
        &h,
        "buildSignedTransaction",
        json!({"chain": "Ethereum", "base64Tx": base64_tx, "signature": signature}),
    )
    .await;
    assert_eq!(signed["code"], "ERROR");
    assert_eq!(signed["error"], "SENDER_MISMATCH");
    assert_eq!(signed["signedTx"], "");
    assert_eq!(signed["txHash"], "");
}

#[tokio::test]
async fn invalid_numeric_field_is_named() {
    let h = harness(Node::default());
    let doc = json!({
        "chainId": "1",
        "fromAddress": SENDER,
        "toAddress": RECIPIENT,
        "amount": "1e18",
        "maxFeePerGas": "30000000000",
        "maxPriorityFeePerGas": "1000000000"
    });

    let reply = call(
        &h,
        "createUnSignTransaction",
        json!({"chain": "Ethereum", "base64Tx": STANDARD.encode(doc.to_string())}),
    )
    .await;
    assert_eq!(reply["error"], "INVALID_NUMERIC_FIELD");
    assert!(reply["msg"].as_str().unwrap().contains("amount"));
}

#[tokio::test]
async fn account_reads_nonce_and_balance() {
    let h = harness(Node::default());
    let reply = call(
        &h,
        "getAccount",
        json!({"chain": "Ethereum", "address": SENDER, "contractAddress": "0x00"}),
    )
    .await;

    assert_eq!(reply["code"], "SUCCESS");
    assert_eq!(reply["accountNumber"], "0");
    assert_eq!(reply["sequence"], "5");
    assert_eq!(reply["balance"], "1500000000000000000");
}

// ─── Dispatcher boundary ───────────────────────────────────────────

#[tokio::test]
async fn unknown_chain_never_reaches_an_adaptor() {
    let h = harness(Node::default());

    let reply = call(&h, "getFee", json!({"chain": "Bitcoin"})).await;
    assert_eq!(reply["code"], "ERROR");
    assert_eq!(reply["error"], "UNSUPPORTED_CHAIN");

    let reply = call(
        &h,
        "getAccount",
        json!({"chain": "ethereum", "address": SENDER}),
    )
    .await;
    assert_eq!(reply["error"], "UNSUPPORTED_CHAIN");

    assert_eq!(h.node.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.explorer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn panic_in_adaptor_becomes_internal_error() {
    let h = harness(Node {
        panic_on_fee: true,
        ..Node::default()
    });

    let err = h
        .dispatcher
        .handle("getFee", json!({"chain": "Ethereum"}))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Internal(ref msg) if msg.contains("gas oracle")));

    // The process keeps serving.
    let reply = call(
        &h,
        "validAddress",
        json!({"chain": "Ethereum", "address": SENDER}),
    )
    .await;
    assert_eq!(reply["valid"], true);
}

#[tokio::test]
async fn panic_surfaces_as_jsonrpc_internal_error() {
    let h = harness(Node {
        panic_on_fee: true,
        ..Node::default()
    });

    let line = json!({
        "jsonrpc": "2.0",
        "method": "getFee",
        "params": {"chain": "Ethereum"},
        "id": 9
    })
    .to_string();
    let response = process_line(&h.dispatcher, &line).await;
    let error = response.error.unwrap();
    assert_eq!(error.code, -32603);
    assert!(response.result.is_none());
}

#[tokio::test]
async fn fee_tiers_over_the_wire() {
    let h = harness(Node::default());
    let reply = call(&h, "getFee", json!({"chain": "Ethereum"})).await;

    assert_eq!(reply["slowFee"], "30000000000|1000000000");
    assert_eq!(reply["normalFee"], "30000000000|1000000000|*2");
    assert_eq!(reply["fastFee"], "30000000000|1000000000|*3");
}
