use alloy_primitives::Address;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Length of a textual address: `0x` plus 40 hex characters.
pub const ADDRESS_TEXT_LEN: usize = 42;

/// Derives an Ethereum address from a hex-encoded public key.
///
/// The first byte of the decoded key is treated as a format marker and
/// dropped (`0x04` for uncompressed SEC1 keys); the remaining body is
/// Keccak-256 hashed and the last 20 bytes of the digest form the address.
///
/// Only the hex itself is validated. A key of the wrong length or with an
/// unexpected format byte still yields an address, just not one anybody
/// holds the private key for.
pub fn pubkey_hex_to_address(public_key: &str) -> Result<Address, EthError> {
    let hex_str = public_key
        .strip_prefix("0x")
        .or_else(|| public_key.strip_prefix("0X"))
        .unwrap_or(public_key);

    let key_bytes = hex::decode(hex_str)
        .map_err(|e| EthError::InvalidEncoding(format!("public key is not hex: {e}")))?;

    let body = key_bytes.get(1..).unwrap_or_default();
    let hash = Keccak256::digest(body);

    Ok(Address::from_slice(&hash[12..]))
}

/// Renders an address as lowercase `0x`-prefixed hex.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Syntactic address check: `0x` followed by exactly 40 hex characters.
///
/// Checksum casing is not verified.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == ADDRESS_TEXT_LEN
        && address.starts_with("0x")
        && address[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses a `0x`-prefixed 40-hex-character address.
pub fn parse_address(address: &str) -> Result<Address, EthError> {
    let hex_str = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress(format!("{address}: must start with 0x")))?;

    if hex_str.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "{address}: expected 40 hex characters, got {}",
            hex_str.len()
        )));
    }

    let bytes = hex::decode(hex_str)
        .map_err(|e| EthError::InvalidAddress(format!("{address}: invalid hex: {e}")))?;

    Ok(Address::from_slice(&bytes))
}
