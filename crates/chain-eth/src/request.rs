//! Chain-agnostic transaction request as it arrives over the wire.
//!
//! Clients send `base64(json)` with every amount and fee as a decimal
//! string. The document is decoded once per call and never mutated.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EthError;
use crate::numeric::parse_decimal_u64;

/// Contract-address values that stand for the chain's native asset.
const NATIVE_ASSET_PLACEHOLDERS: [&str; 3] =
    ["", "0x0000000000000000000000000000000000000000", "0x00"];

/// Decoded transaction request. Numeric fields stay strings until the
/// builder validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRequest {
    pub chain_id: String,
    pub from_address: String,
    pub to_address: String,
    pub contract_address: String,
    pub amount: String,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    pub nonce: u64,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    pub gas_limit: u64,
    pub max_fee_per_gas: String,
    pub max_priority_fee_per_gas: String,
}

impl TransactionRequest {
    /// Decodes a standard-alphabet base64 JSON document.
    pub fn from_base64(encoded: &str) -> Result<Self, EthError> {
        let json = STANDARD
            .decode(encoded.trim())
            .map_err(|e| EthError::Decode(format!("invalid base64: {e}")))?;

        serde_json::from_slice(&json).map_err(|e| EthError::Decode(format!("invalid json: {e}")))
    }

    /// Encodes the request the way a client would send it.
    pub fn to_base64(&self) -> Result<String, EthError> {
        let json = serde_json::to_vec(self).map_err(|e| EthError::Encoding(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    /// True when the request moves the native asset rather than a token.
    pub fn is_native_transfer(&self) -> bool {
        is_native_asset(&self.contract_address)
    }
}

/// True for an empty, all-zero or `0x00` placeholder contract address.
pub fn is_native_asset(contract_address: &str) -> bool {
    NATIVE_ASSET_PLACEHOLDERS.contains(&contract_address)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => {
            parse_decimal_u64("integer", &s).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        STANDARD.encode(json.as_bytes())
    }

    #[test]
    fn decodes_numbers_and_strings_for_nonce_and_gas() {
        let numbers = encode(
            r#"{"chainId":"1","fromAddress":"0xaa","toAddress":"0xbb","contractAddress":"",
                "amount":"1","nonce":5,"gasLimit":21000,"maxFeePerGas":"2","maxPriorityFeePerGas":"1"}"#,
        );
        let strings = encode(
            r#"{"chainId":"1","fromAddress":"0xaa","toAddress":"0xbb","contractAddress":"",
                "amount":"1","nonce":"5","gasLimit":"21000","maxFeePerGas":"2","maxPriorityFeePerGas":"1"}"#,
        );

        let a = TransactionRequest::from_base64(&numbers).unwrap();
        let b = TransactionRequest::from_base64(&strings).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.nonce, 5);
        assert_eq!(a.gas_limit, 21_000);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req = TransactionRequest::from_base64(&encode(r#"{"chainId":"1"}"#)).unwrap();
        assert_eq!(req.chain_id, "1");
        assert!(req.amount.is_empty());
        assert_eq!(req.nonce, 0);
    }

    #[test]
    fn malformed_base64_is_decode_error() {
        let err = TransactionRequest::from_base64("not base64!!").unwrap_err();
        assert!(matches!(err, EthError::Decode(_)));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = TransactionRequest::from_base64(&encode("{chainId:")).unwrap_err();
        assert!(matches!(err, EthError::Decode(_)));
    }

    #[test]
    fn non_numeric_nonce_text_is_decode_error() {
        let err = TransactionRequest::from_base64(&encode(r#"{"nonce":"five"}"#)).unwrap_err();
        assert!(matches!(err, EthError::Decode(_)));
    }

    #[test]
    fn base64_round_trip_preserves_request() {
        let req = TransactionRequest {
            chain_id: "137".into(),
            from_address: "0xaa".into(),
            to_address: "0xbb".into(),
            contract_address: "0xcc".into(),
            amount: "42".into(),
            nonce: 9,
            gas_limit: 65_000,
            max_fee_per_gas: "30000000000".into(),
            max_priority_fee_per_gas: "1000000000".into(),
        };
        let decoded = TransactionRequest::from_base64(&req.to_base64().unwrap()).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn native_asset_placeholders() {
        assert!(is_native_asset(""));
        assert!(is_native_asset("0x00"));
        assert!(is_native_asset("0x0000000000000000000000000000000000000000"));
        assert!(!is_native_asset("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
        assert!(!is_native_asset("0x0"));
    }
}
