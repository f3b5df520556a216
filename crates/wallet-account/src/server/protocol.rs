//! JSON-RPC 2.0 envelope types.

use serde::{Deserialize, Serialize};

use crate::dispatcher::DispatchError;

pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
    #[default]
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: JsonRpcId,
}

impl JsonRpcRequest {
    pub fn validate(&self) -> Result<(), JsonRpcError> {
        if self.jsonrpc != "2.0" {
            return Err(JsonRpcError::invalid_request(
                "jsonrpc version must be \"2.0\"",
            ));
        }
        if self.method.is_empty() {
            return Err(JsonRpcError::invalid_request("method cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: JsonRpcId,
}

impl JsonRpcResponse {
    pub fn success(id: JsonRpcId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    pub fn parse_error(message: &str) -> Self {
        Self {
            code: error_codes::PARSE_ERROR,
            message: format!("Parse error: {message}"),
        }
    }

    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: error_codes::INVALID_REQUEST,
            message: format!("Invalid request: {message}"),
        }
    }
}

impl From<DispatchError> for JsonRpcError {
    fn from(e: DispatchError) -> Self {
        let code = match e {
            DispatchError::UnknownMethod(_) => error_codes::METHOD_NOT_FOUND,
            DispatchError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            DispatchError::Internal(_) => error_codes::INTERNAL_ERROR,
        };
        Self {
            code,
            message: e.to_string(),
        }
    }
}
