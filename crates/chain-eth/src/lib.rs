//! Ethereum/EVM codecs for the account gateway.
//!
//! This crate provides:
//! - Decimal-string big-integer parsing for wire fields
//! - Address derivation from raw public keys and syntactic address checks
//! - ERC-20 `transfer` call data encoding and decoding
//! - Decoding of base64/JSON transaction requests
//! - EIP-1559 transaction shaping, unsigned encoding, detached-signature
//!   assembly and sender recovery

pub mod abi;
pub mod address;
pub mod erc20;
pub mod error;
pub mod numeric;
pub mod request;
pub mod signature;
pub mod transaction;
