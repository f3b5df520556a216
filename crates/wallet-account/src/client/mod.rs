//! Remote collaborators of the Ethereum adaptor.
//!
//! [`EthClient`] is the node RPC surface, [`EthDataClient`] the
//! explorer-style history and balance service. Both are traits so the
//! adaptor can be exercised against in-memory doubles.

pub mod explorer;
pub mod rpc;

use alloy_primitives::{Address, Bytes, B256, B64, U256, U64};
use async_trait::async_trait;
use chain_eth::request::is_native_asset;
use serde::Deserialize;
use thiserror::Error;

pub use explorer::ExplorerClient;
pub use rpc::RpcClient;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("batch of {len} requests exceeds limit of {limit}")]
    BatchTooLarge { len: u64, limit: u64 },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Block header as returned by `eth_getBlockBy*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcHeader {
    pub hash: B256,
    pub parent_hash: B256,
    #[serde(rename = "sha3Uncles")]
    pub uncles_hash: B256,
    pub miner: Address,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    #[serde(default)]
    pub parent_beacon_block_root: Option<B256>,
    #[serde(default)]
    pub difficulty: U256,
    pub number: U64,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    #[serde(default)]
    pub extra_data: Bytes,
    #[serde(default)]
    pub mix_hash: B256,
    #[serde(default)]
    pub nonce: B64,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub withdrawals_root: Option<B256>,
    #[serde(default)]
    pub blob_gas_used: Option<U64>,
    #[serde(default)]
    pub excess_blob_gas: Option<U64>,
}

/// A block fetched with full transaction objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RpcBlock {
    #[serde(flatten)]
    pub header: RpcHeader,
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: B256,
    pub from: Address,
    /// `None` for contract creation.
    #[serde(default)]
    pub to: Option<Address>,
    pub value: U256,
    #[serde(default)]
    pub input: Bytes,
    #[serde(default)]
    pub gas_price: Option<U256>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    /// 1 on success, 0 on revert. Absent on pre-Byzantium receipts.
    #[serde(default)]
    pub status: Option<U64>,
    pub transaction_index: U64,
    pub block_number: U64,
    pub gas_used: U64,
    #[serde(default)]
    pub effective_gas_price: Option<U256>,
}

/// One row of an explorer address-history page. Values are decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressTx {
    pub hash: String,
    pub block_number: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas_used: String,
    pub gas_price: String,
    pub contract_address: String,
}

/// Which history an address query walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryKind {
    Native,
    Token { contract: String },
}

impl HistoryKind {
    /// Native history for a placeholder contract address, token history
    /// otherwise.
    pub fn for_contract(contract_address: &str) -> Self {
        if is_native_asset(contract_address) {
            Self::Native
        } else {
            Self::Token {
                contract: contract_address.to_string(),
            }
        }
    }
}

/// Ethereum node RPC.
///
/// `None` block numbers mean the latest block. Absent resources are
/// reported as [`ClientError::NotFound`].
#[async_trait]
pub trait EthClient: Send + Sync {
    async fn block_by_number(&self, number: Option<u64>) -> Result<RpcBlock, ClientError>;

    async fn block_by_hash(&self, hash: B256) -> Result<RpcBlock, ClientError>;

    async fn header_by_number(&self, number: Option<u64>) -> Result<RpcHeader, ClientError>;

    async fn header_by_hash(&self, hash: B256) -> Result<RpcHeader, ClientError>;

    /// Headers `start..=end` in ascending order.
    async fn headers_by_range(&self, start: u64, end: u64) -> Result<Vec<RpcHeader>, ClientError>;

    /// Deployed code at `address`; empty for externally owned accounts.
    async fn code_at(&self, address: Address) -> Result<Bytes, ClientError>;

    async fn transaction_count(&self, address: Address) -> Result<u64, ClientError>;

    async fn transaction_by_hash(&self, hash: B256) -> Result<RpcTransaction, ClientError>;

    async fn receipt_by_hash(&self, hash: B256) -> Result<RpcReceipt, ClientError>;

    async fn gas_price(&self) -> Result<U256, ClientError>;

    async fn gas_tip_cap(&self) -> Result<U256, ClientError>;

    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<B256, ClientError>;
}

/// Explorer-style indexed data.
#[async_trait]
pub trait EthDataClient: Send + Sync {
    async fn transactions_by_address(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
        kind: &HistoryKind,
    ) -> Result<Vec<AddressTx>, ClientError>;

    /// Native balance, or the token balance when `contract` is given.
    /// `None` when the service has no usable number for the address.
    async fn balance(
        &self,
        address: &str,
        contract: Option<&str>,
    ) -> Result<Option<U256>, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_kind_follows_native_placeholders() {
        assert_eq!(HistoryKind::for_contract(""), HistoryKind::Native);
        assert_eq!(HistoryKind::for_contract("0x00"), HistoryKind::Native);
        assert_eq!(
            HistoryKind::for_contract("0x0000000000000000000000000000000000000000"),
            HistoryKind::Native
        );
        assert_eq!(
            HistoryKind::for_contract("0xdac17f958d2ee523a2206206994597c13d831ec7"),
            HistoryKind::Token {
                contract: "0xdac17f958d2ee523a2206206994597c13d831ec7".into()
            }
        );
    }

    #[test]
    fn block_deserializes_with_missing_optionals() {
        let block: RpcBlock = serde_json::from_value(json!({
            "hash": format!("0x{}", "11".repeat(32)),
            "parentHash": format!("0x{}", "22".repeat(32)),
            "sha3Uncles": format!("0x{}", "33".repeat(32)),
            "miner": "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
            "stateRoot": format!("0x{}", "44".repeat(32)),
            "transactionsRoot": format!("0x{}", "55".repeat(32)),
            "receiptsRoot": format!("0x{}", "66".repeat(32)),
            "difficulty": "0x0",
            "number": "0x10",
            "gasLimit": "0x1c9c380",
            "gasUsed": "0x5208",
            "timestamp": "0x6500",
            "extraData": "0xabcd",
            "mixHash": format!("0x{}", "77".repeat(32)),
            "nonce": "0x0000000000000042",
            "transactions": [{
                "hash": format!("0x{}", "88".repeat(32)),
                "from": "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
                "to": null,
                "value": "0xde0b6b3a7640000",
                "input": "0x"
            }]
        }))
        .unwrap();

        assert_eq!(block.header.number.to::<u64>(), 16);
        assert_eq!(block.header.nonce, B64::from(0x42u64.to_be_bytes()));
        assert!(block.header.base_fee_per_gas.is_none());
        assert!(block.header.withdrawals_root.is_none());
        assert_eq!(block.transactions.len(), 1);
        assert!(block.transactions[0].to.is_none());
        assert_eq!(
            block.transactions[0].value,
            U256::from(1_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn address_tx_tolerates_missing_fields() {
        let tx: AddressTx = serde_json::from_value(json!({
            "hash": "0xabc",
            "blockNumber": "100",
            "from": "0x1",
            "to": "0x2",
            "value": "5"
        }))
        .unwrap();
        assert_eq!(tx.block_number, "100");
        assert!(tx.gas_used.is_empty());
    }
}
