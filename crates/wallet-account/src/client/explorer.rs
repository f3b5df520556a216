//! Etherscan-style explorer API.

use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use chain_eth::numeric::parse_decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{AddressTx, ClientError, EthDataClient, HistoryKind};

/// Message the explorer returns with status `0` for an empty history.
const NO_TRANSACTIONS: &str = "No transactions found";

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

/// [`EthDataClient`] backed by an explorer REST endpoint.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    api_key: String,
}

impl ExplorerClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::Transport(format!("invalid data api url {base_url:?}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    async fn get(&self, mut query: Vec<(&'static str, String)>) -> Result<ExplorerResponse, ClientError> {
        query.push(("apikey", self.api_key.clone()));

        let response = self
            .http
            .get(self.base_url.clone())
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }
}

fn history_query(
    address: &str,
    page: u32,
    page_size: u32,
    kind: &HistoryKind,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("module", "account".to_string())];
    match kind {
        HistoryKind::Native => query.push(("action", "txlist".to_string())),
        HistoryKind::Token { contract } => {
            query.push(("action", "tokentx".to_string()));
            query.push(("contractaddress", contract.clone()));
        }
    }
    query.extend([
        ("address", address.to_string()),
        ("page", page.to_string()),
        ("offset", page_size.to_string()),
        ("sort", "desc".to_string()),
    ]);
    query
}

fn balance_query(address: &str, contract: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("module", "account".to_string())];
    match contract {
        Some(contract) => {
            query.push(("action", "tokenbalance".to_string()));
            query.push(("contractaddress", contract.to_string()));
        }
        None => query.push(("action", "balance".to_string())),
    }
    query.extend([("address", address.to_string()), ("tag", "latest".to_string())]);
    query
}

fn parse_history(response: ExplorerResponse) -> Result<Vec<AddressTx>, ClientError> {
    if response.status != "1" {
        if response.message == NO_TRANSACTIONS {
            return Ok(Vec::new());
        }
        return Err(upstream_error(response));
    }
    serde_json::from_value(response.result).map_err(|e| ClientError::Decode(e.to_string()))
}

/// A balance that is not a decimal number is treated as absent.
fn parse_balance(response: ExplorerResponse) -> Result<Option<U256>, ClientError> {
    if response.status != "1" {
        return Err(upstream_error(response));
    }
    Ok(response
        .result
        .as_str()
        .and_then(|text| parse_decimal("balance", text).ok()))
}

fn upstream_error(response: ExplorerResponse) -> ClientError {
    let detail = match response.result {
        Value::String(text) if !text.is_empty() => text,
        _ => response.message.clone(),
    };
    ClientError::Rpc {
        code: response.status.parse().unwrap_or_default(),
        message: format!("{}: {detail}", response.message),
    }
}

#[async_trait]
impl EthDataClient for ExplorerClient {
    async fn transactions_by_address(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
        kind: &HistoryKind,
    ) -> Result<Vec<AddressTx>, ClientError> {
        let response = self
            .get(history_query(address, page, page_size, kind))
            .await?;
        parse_history(response)
    }

    async fn balance(
        &self,
        address: &str,
        contract: Option<&str>,
    ) -> Result<Option<U256>, ClientError> {
        let response = self.get(balance_query(address, contract)).await?;
        parse_balance(response)
    }
}
