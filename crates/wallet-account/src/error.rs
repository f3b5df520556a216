use chain_eth::error::EthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientError;

/// Failures surfaced by the account gateway.
///
/// Adaptors never let these escape a request: they are folded into the
/// error reply of the operation, tagged with [`ErrorCode`].
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid {field}: {value:?}")]
    InvalidNumericField { field: String, value: String },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("sender mismatch: expected {expected}, got {recovered}")]
    SenderMismatch { expected: String, recovered: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("failed to set up chain {chain}: {reason}")]
    Setup { chain: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Machine-readable error kind carried in every error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DecodeError,
    InvalidNumericField,
    InvalidEncoding,
    UnsupportedChain,
    BroadcastFailed,
    UpstreamError,
    NotFound,
    SenderMismatch,
    InternalError,
}

impl AccountError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Decode(_) => ErrorCode::DecodeError,
            Self::InvalidNumericField { .. } => ErrorCode::InvalidNumericField,
            Self::InvalidEncoding(_) => ErrorCode::InvalidEncoding,
            Self::UnsupportedChain(_) => ErrorCode::UnsupportedChain,
            Self::BroadcastFailed(_) => ErrorCode::BroadcastFailed,
            Self::Upstream(_) => ErrorCode::UpstreamError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::SenderMismatch { .. } => ErrorCode::SenderMismatch,
            Self::Internal(_) | Self::Setup { .. } | Self::Config(_) => ErrorCode::InternalError,
        }
    }
}

impl From<EthError> for AccountError {
    fn from(e: EthError) -> Self {
        match e {
            EthError::Decode(msg) => Self::Decode(msg),
            EthError::InvalidNumericField { field, value } => Self::InvalidNumericField {
                field: field.to_string(),
                value,
            },
            EthError::InvalidEncoding(msg)
            | EthError::InvalidAddress(msg)
            | EthError::InvalidSignature(msg) => Self::InvalidEncoding(msg),
            EthError::SenderMismatch {
                expected,
                recovered,
            } => Self::SenderMismatch {
                expected,
                recovered,
            },
            EthError::Encoding(msg) => Self::Internal(msg),
        }
    }
}

impl From<ClientError> for AccountError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NotFound(what) => Self::NotFound(what),
            other => Self::Upstream(other.to_string()),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
