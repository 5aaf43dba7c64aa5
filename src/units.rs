use rust_decimal::Decimal;

use crate::error::{DomainError, Result};

/// Decimals between the smallest on-chain unit and the canonical unit
/// (wei → ETH).
pub const CANONICAL_DECIMALS: u32 = 18;

/// Convert an integer amount in the smallest currency unit to canonical units.
///
/// `"1000000000000000000"` → `1`, `"50000000000000000"` → `0.05`.
pub fn to_canonical_units(raw: &str) -> Result<Decimal> {
    to_canonical_units_with_decimals(raw, CANONICAL_DECIMALS)
}

/// Same as [`to_canonical_units`] for currencies with a different number of
/// decimals (e.g. 6 for USDC).
pub fn to_canonical_units_with_decimals(raw: &str, decimals: u32) -> Result<Decimal> {
    let invalid = |reason| DomainError::InvalidPrice {
        raw: raw.to_string(),
        reason,
    };

    let digits = raw.trim();
    if digits.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected a non-negative integer"));
    }

    let mut amount = Decimal::from_str_exact(digits).map_err(|_| invalid("amount out of range"))?;
    amount
        .set_scale(decimals)
        .map_err(|_| invalid("too many decimals"))?;
    Ok(amount.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_wei_to_canonical() {
        assert_eq!(to_canonical_units("1000000000000000000").unwrap(), dec!(1));
        assert_eq!(to_canonical_units("50000000000000000").unwrap(), dec!(0.05));
        assert_eq!(to_canonical_units("1").unwrap(), dec!(0.000000000000000001));
        assert_eq!(to_canonical_units("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn large_amounts_keep_precision() {
        assert_eq!(
            to_canonical_units("123456789000000000000000").unwrap(),
            dec!(123456.789)
        );
    }

    #[test]
    fn other_denominations() {
        assert_eq!(
            to_canonical_units_with_decimals("5000000", 6).unwrap(),
            dec!(5)
        );
    }

    #[test]
    fn rejects_non_integer_input() {
        for bad in ["", "  ", "-5", "1.5", "0x10", "1e18"] {
            assert!(
                matches!(to_canonical_units(bad), Err(DomainError::InvalidPrice { .. })),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        let huge = "9".repeat(40);
        assert!(to_canonical_units(&huge).is_err());
    }
}
