use alloy_primitives::{Address, B256, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Length of a recoverable signature: `r[32] || s[32] || v[1]`.
pub const SIGNATURE_LEN: usize = 65;

/// A signature produced outside this process over a transaction's
/// signing hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl DetachedSignature {
    /// Parses a hex string (optional `0x`) holding 65 bytes `r || s || v`.
    ///
    /// `v` may be the raw y-parity (0/1) or the legacy 27/28 form. High-s
    /// signatures are rejected.
    pub fn from_hex(signature_hex: &str) -> Result<Self, EthError> {
        let hex_str = signature_hex
            .strip_prefix("0x")
            .or_else(|| signature_hex.strip_prefix("0X"))
            .unwrap_or(signature_hex);

        let bytes = hex::decode(hex_str)
            .map_err(|e| EthError::InvalidSignature(format!("signature is not hex: {e}")))?;

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EthError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(EthError::InvalidSignature(format!(
                "expected {SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let v = bytes[64];
        let parity = if v >= 27 { v - 27 } else { v };
        if parity > 1 {
            return Err(EthError::InvalidSignature(format!("invalid v: {v}")));
        }

        let signature = Signature::from_slice(&bytes[..64])
            .map_err(|e| EthError::InvalidSignature(e.to_string()))?;
        if signature.normalize_s().is_some() {
            return Err(EthError::InvalidSignature("s is not in the lower half order".into()));
        }

        let recovery_id = RecoveryId::from_byte(parity)
            .ok_or_else(|| EthError::InvalidSignature(format!("invalid v: {v}")))?;

        Ok(Self {
            signature,
            recovery_id,
        })
    }

    pub fn y_parity(&self) -> bool {
        self.recovery_id.is_y_odd()
    }

    pub fn r(&self) -> U256 {
        U256::from_be_slice(&self.signature.r().to_bytes())
    }

    pub fn s(&self) -> U256 {
        U256::from_be_slice(&self.signature.s().to_bytes())
    }

    /// Recovers the address whose key produced this signature over `hash`.
    pub fn recover_address(&self, hash: &B256) -> Result<Address, EthError> {
        let key =
            VerifyingKey::recover_from_prehash(hash.as_slice(), &self.signature, self.recovery_id)
                .map_err(|e| EthError::InvalidSignature(format!("recovery failed: {e}")))?;
        Ok(verifying_key_to_address(&key))
    }
}

/// Keccak-256 of the uncompressed point without its `0x04` marker, last
/// 20 bytes.
pub fn verifying_key_to_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
