//! Decimal-string codec for arbitrary-precision integers.
//!
//! Chain ids, fee caps and amounts cross the wire as base-10 strings so that
//! no client has to squeeze them through a fixed-width native type. Inside
//! the crate they are [`U256`].

use alloy_primitives::U256;

use crate::error::EthError;

/// Parses a base-10 string into a [`U256`].
///
/// Only ASCII digits are accepted: no sign, no `0x` prefix, no separators,
/// no surrounding whitespace. `field` names the offending input in the error.
pub fn parse_decimal(field: &'static str, value: &str) -> Result<U256, EthError> {
    let invalid = || EthError::InvalidNumericField {
        field,
        value: value.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    U256::from_str_radix(value, 10).map_err(|_| invalid())
}

/// Parses a base-10 string into a `u64`, with the same rules as
/// [`parse_decimal`].
pub fn parse_decimal_u64(field: &'static str, value: &str) -> Result<u64, EthError> {
    let wide = parse_decimal(field, value)?;
    u64::try_from(wide).map_err(|_| EthError::InvalidNumericField {
        field,
        value: value.to_string(),
    })
}

/// Renders an integer as its base-10 string.
pub fn to_decimal(value: &U256) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_ether_in_wei() {
        let v = parse_decimal("amount", "1000000000000000000").unwrap();
        assert_eq!(v, U256::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn parses_full_width_values() {
        let max = U256::MAX.to_string();
        assert_eq!(parse_decimal("amount", &max).unwrap(), U256::MAX);
    }

    #[test]
    fn rejects_overflow() {
        // 2^256
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(parse_decimal("amount", too_big).is_err());
    }

    #[test]
    fn rejects_empty_signed_and_hex_inputs() {
        for bad in ["", "-1", "+1", "0x10", "1_000", " 1", "1.5"] {
            let err = parse_decimal("chainId", bad).unwrap_err();
            assert_eq!(
                err,
                EthError::InvalidNumericField {
                    field: "chainId",
                    value: bad.to_string()
                },
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn leading_zeros_are_accepted() {
        assert_eq!(parse_decimal("nonce", "0005").unwrap(), U256::from(5));
    }

    #[test]
    fn u64_variant_rejects_wide_values() {
        assert_eq!(parse_decimal_u64("gasLimit", "21000").unwrap(), 21_000);
        assert!(parse_decimal_u64("gasLimit", "18446744073709551616").is_err());
    }

    #[test]
    fn decimal_rendering_is_plain() {
        assert_eq!(to_decimal(&U256::from(30_000_000_000u64)), "30000000000");
        assert_eq!(to_decimal(&U256::ZERO), "0");
    }
}
