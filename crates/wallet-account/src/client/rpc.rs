//! Ethereum JSON-RPC over HTTP.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ClientError, EthClient, RpcBlock, RpcHeader, RpcReceipt, RpcTransaction};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// [`EthClient`] backed by a node's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: reqwest::Url,
}

impl RpcClient {
    /// Validates the endpoint and prepares the HTTP client. No request is
    /// made here.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| ClientError::Transport(format!("invalid rpc url {url:?}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ClientError> {
        let body = request_body(0, method, params);
        let response: RpcResponse = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::trace!(method, "rpc call finished");
        decode_result(method, response)
    }

    async fn batch<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Vec<T>, ClientError> {
        if params.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<Value> = params
            .into_iter()
            .enumerate()
            .map(|(id, p)| request_body(id as u64, method, p))
            .collect();

        let responses: Vec<RpcResponse> = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_batch(method, body.len(), responses)
    }
}

fn request_body(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

/// Largest JSON-RPC batch the client will build.
const MAX_BATCH_LEN: u64 = 1000;

/// `eth_getBlockByNumber` params for every height in `start..=end`.
fn range_params(start: u64, end: u64) -> Result<Vec<Value>, ClientError> {
    if start > end {
        return Ok(Vec::new());
    }
    let len = (end - start).saturating_add(1);
    if len > MAX_BATCH_LEN {
        return Err(ClientError::BatchTooLarge {
            len,
            limit: MAX_BATCH_LEN,
        });
    }
    Ok((start..=end)
        .map(|n| json!([block_tag(Some(n)), false]))
        .collect())
}

fn block_tag(number: Option<u64>) -> Value {
    match number {
        Some(n) => Value::String(format!("{:#x}", n)),
        None => Value::String("latest".into()),
    }
}

fn decode_result<T: DeserializeOwned>(method: &str, response: RpcResponse) -> Result<T, ClientError> {
    if let Some(err) = response.error {
        return Err(ClientError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    match response.result {
        None | Some(Value::Null) => Err(ClientError::NotFound(format!("{method} result"))),
        Some(value) => serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string())),
    }
}

/// Batch replies may arrive in any order; they are matched back by id.
fn decode_batch<T: DeserializeOwned>(
    method: &str,
    expected: usize,
    responses: Vec<RpcResponse>,
) -> Result<Vec<T>, ClientError> {
    if responses.len() != expected {
        return Err(ClientError::Decode(format!(
            "expected {expected} batch replies, got {}",
            responses.len()
        )));
    }

    let mut slots: Vec<Option<RpcResponse>> = (0..expected).map(|_| None).collect();
    for response in responses {
        let id = response
            .id
            .as_u64()
            .and_then(|id| usize::try_from(id).ok())
            .filter(|id| *id < expected)
            .ok_or_else(|| ClientError::Decode(format!("unexpected batch id {}", response.id)))?;
        slots[id] = Some(response);
    }

    slots
        .into_iter()
        .map(|slot| {
            let response =
                slot.ok_or_else(|| ClientError::Decode("duplicate batch id".to_string()))?;
            decode_result(method, response)
        })
        .collect()
}

#[async_trait]
impl EthClient for RpcClient {
    async fn block_by_number(&self, number: Option<u64>) -> Result<RpcBlock, ClientError> {
        self.call("eth_getBlockByNumber", json!([block_tag(number), true]))
            .await
    }

    async fn block_by_hash(&self, hash: B256) -> Result<RpcBlock, ClientError> {
        self.call("eth_getBlockByHash", json!([hash, true])).await
    }

    async fn header_by_number(&self, number: Option<u64>) -> Result<RpcHeader, ClientError> {
        self.call("eth_getBlockByNumber", json!([block_tag(number), false]))
            .await
    }

    async fn header_by_hash(&self, hash: B256) -> Result<RpcHeader, ClientError> {
        self.call("eth_getBlockByHash", json!([hash, false])).await
    }

    async fn headers_by_range(&self, start: u64, end: u64) -> Result<Vec<RpcHeader>, ClientError> {
        let params = range_params(start, end)?;
        self.batch("eth_getBlockByNumber", params).await
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ClientError> {
        self.call("eth_getCode", json!([address, "latest"])).await
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ClientError> {
        let count: U64 = self
            .call("eth_getTransactionCount", json!([address, "latest"]))
            .await?;
        Ok(count.to::<u64>())
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<RpcTransaction, ClientError> {
        self.call("eth_getTransactionByHash", json!([hash])).await
    }

    async fn receipt_by_hash(&self, hash: B256) -> Result<RpcReceipt, ClientError> {
        self.call("eth_getTransactionReceipt", json!([hash])).await
    }

    async fn gas_price(&self) -> Result<U256, ClientError> {
        self.call("eth_gasPrice", json!([])).await
    }

    async fn gas_tip_cap(&self) -> Result<U256, ClientError> {
        self.call("eth_maxPriorityFeePerGas", json!([])).await
    }

    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<B256, ClientError> {
        let encoded = format!("0x{}", hex::encode(raw_tx));
        self.call("eth_sendRawTransaction", json!([encoded])).await
    }
}
