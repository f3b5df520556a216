//! Request and reply shapes of the account RPC surface.
//!
//! Every request names the chain it is meant for; every reply carries a
//! [`ReturnCode`], a human-readable message and the operation payload
//! flattened next to them.

use serde::{Deserialize, Serialize};

use crate::error::{AccountError, ErrorCode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnCode {
    Success,
    #[default]
    Error,
}

/// Tagged result of an operation. Failures are values, never panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply<T> {
    pub code: ReturnCode,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Reply<T> {
    pub fn success(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: ReturnCode::Success,
            msg: msg.into(),
            error: None,
            data,
        }
    }

    /// Error reply that still carries a payload (e.g. a zero balance).
    pub fn failure_with(msg: impl Into<String>, err: &AccountError, data: T) -> Self {
        Self {
            code: ReturnCode::Error,
            msg: format!("{}: {err}", msg.into()),
            error: Some(err.code()),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ReturnCode::Success
    }
}

impl<T: Default> Reply<T> {
    pub fn failure(msg: impl Into<String>, err: &AccountError) -> Self {
        Self::failure_with(msg, err, T::default())
    }
}

/// Any request that can be routed by chain name.
pub trait ChainRequest {
    fn chain(&self) -> &str;
}

macro_rules! chain_requests {
    ($($name:ident),* $(,)?) => {
        $(
            impl ChainRequest for $name {
                fn chain(&self) -> &str {
                    &self.chain
                }
            }
        )*
    };
}

chain_requests!(
    SupportChainsRequest,
    ConvertAddressRequest,
    ValidAddressRequest,
    BlockNumberRequest,
    BlockHashRequest,
    BlockHeaderNumberRequest,
    BlockHeaderHashRequest,
    BlockByRangeRequest,
    AccountRequest,
    FeeRequest,
    SendTxRequest,
    TxAddressRequest,
    TxHashRequest,
    UnSignTransactionRequest,
    SignedTransactionRequest,
    DecodeTransactionRequest,
    VerifyTransactionRequest,
    ExtraDataRequest,
);

// ─── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportChainsRequest {
    pub chain: String,
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertAddressRequest {
    pub chain: String,
    pub network: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidAddressRequest {
    pub chain: String,
    pub network: String,
    pub address: String,
}

/// Height 0 selects the latest block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockNumberRequest {
    pub chain: String,
    pub height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockHashRequest {
    pub chain: String,
    pub hash: String,
}

/// Height 0 selects the latest header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockHeaderNumberRequest {
    pub chain: String,
    pub network: String,
    pub height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockHeaderHashRequest {
    pub chain: String,
    pub network: String,
    pub hash: String,
}

/// Inclusive decimal height range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockByRangeRequest {
    pub chain: String,
    pub network: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountRequest {
    pub chain: String,
    pub network: String,
    pub address: String,
    pub contract_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeRequest {
    pub chain: String,
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendTxRequest {
    pub chain: String,
    pub network: String,
    pub raw_tx: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxAddressRequest {
    pub chain: String,
    pub network: String,
    pub address: String,
    pub contract_address: String,
    pub page: u32,
    pub pagesize: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxHashRequest {
    pub chain: String,
    pub network: String,
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnSignTransactionRequest {
    pub chain: String,
    pub network: String,
    pub base64_tx: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignedTransactionRequest {
    pub chain: String,
    pub network: String,
    pub base64_tx: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecodeTransactionRequest {
    pub chain: String,
    pub network: String,
    pub raw_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyTransactionRequest {
    pub chain: String,
    pub network: String,
    pub public_key: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtraDataRequest {
    pub chain: String,
    pub network: String,
    pub address: String,
}

// ─── Reply payloads ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportChains {
    pub support: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertAddress {
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidAddress {
    pub valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTransaction {
    pub from: String,
    pub to: String,
    pub token_address: String,
    pub contract_wallet: String,
    pub hash: String,
    pub height: u64,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub height: u64,
    pub hash: String,
    pub base_fee: String,
    pub transactions: Vec<BlockTransaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub hash: String,
    pub parent_hash: String,
    pub uncle_hash: String,
    pub coin_base: String,
    pub root: String,
    pub tx_hash: String,
    pub receipt_hash: String,
    pub parent_beacon_root: String,
    pub difficulty: String,
    pub number: String,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub time: u64,
    pub extra: String,
    pub mix_digest: String,
    pub nonce: String,
    pub base_fee: String,
    pub withdrawals_hash: String,
    pub blob_gas_used: u64,
    pub excess_blob_gas: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeaderInfo {
    pub block_header: Option<BlockHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRange {
    pub block_header: Vec<BlockHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: String,
    pub sequence: String,
    pub balance: String,
}

/// Fee tiers as `gasPrice|gasTipCap[|multiplier]`. The multiplier suffix
/// is an annotation for the client, not an applied factor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub slow_fee: String,
    pub normal_fee: String,
    pub fast_fee: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTx {
    pub tx_hash: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    #[default]
    Success,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxMessage {
    pub hash: String,
    pub index: u32,
    pub froms: Vec<AddressEntry>,
    pub tos: Vec<AddressEntry>,
    pub values: Vec<ValueEntry>,
    pub fee: String,
    pub status: TxStatus,
    #[serde(rename = "type")]
    pub tx_type: i32,
    pub height: String,
    pub contract_address: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxList {
    pub tx: Vec<TxMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxDetail {
    pub tx: Option<TxMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnSignTransaction {
    pub un_sign_tx: String,
    pub sign_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub signed_tx: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeTransaction {
    pub base64_tx: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTransaction {
    pub verify: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraData {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_flattens_payload() {
        let reply = Reply::success(
            "get account success",
            Account {
                account_number: "0".into(),
                sequence: "5".into(),
                balance: "100".into(),
            },
        );

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "SUCCESS",
                "msg": "get account success",
                "accountNumber": "0",
                "sequence": "5",
                "balance": "100"
            })
        );
    }

    #[test]
    fn failure_carries_error_code_and_default_payload() {
        let err = AccountError::UnsupportedChain("Dogecoin".into());
        let reply: Reply<ValidAddress> = Reply::failure("valid address failed", &err);

        assert!(!reply.is_success());
        assert_eq!(reply.error, Some(ErrorCode::UnsupportedChain));
        assert_eq!(reply.msg, "valid address failed: unsupported chain: Dogecoin");
        assert!(!reply.data.valid);
    }

    #[test]
    fn requests_accept_camel_case_and_defaults() {
        let req: TxAddressRequest = serde_json::from_value(json!({
            "chain": "Ethereum",
            "address": "0xabc",
            "contractAddress": "0x00",
            "page": 2
        }))
        .unwrap();

        assert_eq!(req.chain(), "Ethereum");
        assert_eq!(req.contract_address, "0x00");
        assert_eq!(req.page, 2);
        assert_eq!(req.pagesize, 0);
    }

    #[test]
    fn tx_message_serializes_type_keyword() {
        let msg = TxMessage {
            tx_type: 1,
            ..Default::default()
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["status"], "SUCCESS");
    }

    #[test]
    fn reply_round_trips_through_json() {
        let reply = Reply::success(
            "ok",
            SignedTransaction {
                signed_tx: "0x02".into(),
                tx_hash: "0xff".into(),
            },
        );
        let text = serde_json::to_string(&reply).unwrap();
        let back: Reply<SignedTransaction> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, reply);
    }
}
