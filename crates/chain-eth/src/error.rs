use thiserror::Error;

/// Ethereum codec and transaction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EthError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid {field}: {value:?}")]
    InvalidNumericField { field: &'static str, value: String },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("sender mismatch: expected {expected}, got {recovered}")]
    SenderMismatch { expected: String, recovered: String },

    #[error("encoding error: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_decode() {
        let err = EthError::Decode("bad base64".into());
        assert_eq!(err.to_string(), "decode error: bad base64");
    }

    #[test]
    fn display_invalid_numeric_field_names_field() {
        let err = EthError::InvalidNumericField {
            field: "maxFeePerGas",
            value: "12x".into(),
        };
        assert_eq!(err.to_string(), "invalid maxFeePerGas: \"12x\"");
    }

    #[test]
    fn display_invalid_encoding() {
        let err = EthError::InvalidEncoding("odd length".into());
        assert_eq!(err.to_string(), "invalid encoding: odd length");
    }

    #[test]
    fn display_sender_mismatch() {
        let err = EthError::SenderMismatch {
            expected: "0xaa".into(),
            recovered: "0xbb".into(),
        };
        assert_eq!(err.to_string(), "sender mismatch: expected 0xaa, got 0xbb");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(EthError::Encoding("rlp".into()));
        assert!(err.to_string().contains("rlp"));
    }
}
