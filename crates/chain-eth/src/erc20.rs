use alloy_primitives::{Address, U256};

use crate::abi::{
    argument_word, decode_address_word, decode_uint_word, encode_function_call, AbiParam,
    SELECTOR_LEN, WORD_LEN,
};

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Selector plus two argument words. Hex-encoded with `0x` this is the
/// 138-character minimum a transfer input must have.
pub const TRANSFER_CALL_LEN: usize = SELECTOR_LEN + 2 * WORD_LEN;

/// The economically relevant part of a token transfer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
    pub to: Address,
    pub amount: U256,
}

/// Encodes an ERC-20 `transfer(address,uint256)` call.
pub fn encode_transfer(to: &Address, amount: U256) -> Vec<u8> {
    let params = [AbiParam::Address(*to), AbiParam::Uint256(amount)];
    encode_function_call(TRANSFER_SELECTOR, &params)
}

/// Decodes transfer call data back into recipient and amount.
///
/// Returns `None` for anything that does not start with the transfer
/// selector or is shorter than [`TRANSFER_CALL_LEN`]; bytes past the two
/// argument words are ignored.
pub fn decode_transfer(call_data: &[u8]) -> Option<TokenTransfer> {
    if call_data.len() < TRANSFER_CALL_LEN || call_data[..SELECTOR_LEN] != TRANSFER_SELECTOR {
        return None;
    }

    let to = decode_address_word(argument_word(call_data, 0)?)?;
    let amount = decode_uint_word(argument_word(call_data, 1)?)?;
    Some(TokenTransfer { to, amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_address;

    fn dead() -> Address {
        parse_address("0x000000000000000000000000000000000000dEaD").unwrap()
    }

    #[test]
    fn transfer_has_selector_and_length() {
        let data = encode_transfer(&dead(), U256::ZERO);
        assert_eq!(&data[..4], &TRANSFER_SELECTOR);
        assert_eq!(data.len(), TRANSFER_CALL_LEN);
    }

    #[test]
    fn transfer_full_calldata_matches_expected() {
        let to = parse_address("0xdead000000000000000000000000000000000000").unwrap();
        let one_token = U256::from(1_000_000_000_000_000_000u128);

        let data = encode_transfer(&to, one_token);

        assert_eq!(hex::encode(&data[..4]), "a9059cbb");
        assert_eq!(
            hex::encode(&data[4..36]),
            "000000000000000000000000dead000000000000000000000000000000000000"
        );
        assert!(hex::encode(&data[36..68]).ends_with("0de0b6b3a7640000"));
        // As hex with prefix this is exactly the minimum transfer length.
        assert_eq!(format!("0x{}", hex::encode(&data)).len(), 138);
    }

    #[test]
    fn decode_round_trips_extreme_amounts() {
        for amount in [U256::ZERO, U256::from(1u64), U256::MAX] {
            let data = encode_transfer(&dead(), amount);
            let decoded = decode_transfer(&data).unwrap();
            assert_eq!(decoded.to, dead());
            assert_eq!(decoded.amount, amount);
        }
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut data = encode_transfer(&dead(), U256::from(7u64));
        data.extend_from_slice(&[0xff; 5]);
        assert_eq!(decode_transfer(&data).unwrap().amount, U256::from(7u64));
    }

    #[test]
    fn decode_rejects_other_selectors() {
        let mut data = encode_transfer(&dead(), U256::from(7u64));
        // approve(address,uint256)
        data[..4].copy_from_slice(&[0x09, 0x5e, 0xa7, 0xb3]);
        assert!(decode_transfer(&data).is_none());
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let data = encode_transfer(&dead(), U256::from(7u64));
        assert!(decode_transfer(&data[..TRANSFER_CALL_LEN - 1]).is_none());
        assert!(decode_transfer(&[]).is_none());
    }
}
