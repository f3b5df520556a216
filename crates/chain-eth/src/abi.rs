//! Minimal ABI word codec for EVM function calls.
//!
//! Only static 32-byte words are handled, which is all a token transfer
//! needs.

use alloy_primitives::{Address, U256};

/// Size of one ABI word.
pub const WORD_LEN: usize = 32;

/// Size of a function selector.
pub const SELECTOR_LEN: usize = 4;

/// A single static ABI parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer, big-endian.
    Uint256(U256),
}

/// Encodes `selector || word(params[0]) || word(params[1]) || ...`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(SELECTOR_LEN + params.len() * WORD_LEN);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param));
    }

    data
}

fn encode_param(param: &AbiParam) -> [u8; WORD_LEN] {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; WORD_LEN];
            word[12..].copy_from_slice(addr.as_slice());
            word
        }
        AbiParam::Uint256(value) => value.to_be_bytes::<WORD_LEN>(),
    }
}

/// Returns the `index`-th argument word following the selector, if present.
pub fn argument_word(call_data: &[u8], index: usize) -> Option<&[u8]> {
    let start = SELECTOR_LEN + index * WORD_LEN;
    call_data.get(start..start + WORD_LEN)
}

/// Reads an address from the low 20 bytes of a word.
pub fn decode_address_word(word: &[u8]) -> Option<Address> {
    (word.len() == WORD_LEN).then(|| Address::from_slice(&word[12..]))
}

/// Reads a big-endian uint256 word.
pub fn decode_uint_word(word: &[u8]) -> Option<U256> {
    (word.len() == WORD_LEN).then(|| U256::from_be_slice(word))
}
