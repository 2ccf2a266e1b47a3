//! Utility functions and helpers

use alloy_primitives::U256;

use crate::shared::types::BPS_DENOMINATOR;

/// Format a raw integer amount with its token decimals.
///
/// Exact: no floating point is involved, so the rendered string is safe to
/// show next to the minimum-received figure.
pub fn format_amount(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let digits = format!("{:0>width$}", amount, width = decimals as usize + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Minimum amount received under the given slippage tolerance, truncated
pub fn min_amount_out(amount_out: u128, slippage_bps: u32) -> u128 {
    let retained = BPS_DENOMINATOR - slippage_bps.min(BPS_DENOMINATOR);
    // u128 * u32 always fits in 256 bits, and the quotient never exceeds amount_out
    let min_out = U256::from(amount_out) * U256::from(retained) / U256::from(BPS_DENOMINATOR);
    u128::try_from(min_out).unwrap_or(amount_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000, 6), "1.5");
        assert_eq!(format_amount(1, 6), "0.000001");
        assert_eq!(format_amount(42, 0), "42");
        assert_eq!(format_amount(2_000_000_000_000_000_000, 18), "2");
        assert_eq!(format_amount(0, 9), "0");
    }

    #[test]
    fn test_min_amount_out() {
        assert_eq!(min_amount_out(9_872, 50), 9_822);
        assert_eq!(min_amount_out(100, 100), 99);
        assert_eq!(min_amount_out(100, 20_000), 0);
    }

    #[test]
    fn test_min_amount_out_near_u128_max() {
        let amount_out = u128::MAX / 2;
        assert_eq!(min_amount_out(amount_out, 50), amount_out / 10_000 * 9_950 + amount_out % 10_000 * 9_950 / 10_000);
        assert_eq!(min_amount_out(u128::MAX, 0), u128::MAX);
        assert_eq!(min_amount_out(u128::MAX, 10_000), 0);
    }
}
