//! Integer constant-product AMM arithmetic.
//!
//! Every intermediate is a 256-bit unsigned integer so truncation matches
//! the on-chain `uint256` math bit for bit. Floating point never appears
//! here.

use alloy_primitives::U256;

use crate::shared::errors::MathError;
use crate::shared::types::{Ratio, BPS_DENOMINATOR};

fn to_u128(value: U256) -> Result<u128, MathError> {
    u128::try_from(value).map_err(|_| MathError::Overflow)
}

/// Bits needed to hold `Ratio::SCALE`
const SCALE_BITS: usize = 30;

/// `num / den` as a fixed-point [`Ratio`], truncated and saturating at `u64::MAX` raw.
///
/// When `num * SCALE` would not fit in 256 bits both operands are shifted
/// right first; the dropped low bits sit far below the ratio's resolution.
fn ratio_from_fraction(num: U256, den: U256) -> Result<Ratio, MathError> {
    if den.is_zero() {
        return Err(MathError::ZeroReserve);
    }
    let shift = (num.bit_len() + SCALE_BITS).saturating_sub(256);
    let (num, den) = (num >> shift, den >> shift);
    if den.is_zero() {
        return Ok(Ratio::from_raw(u64::MAX));
    }
    let scaled = num
        .checked_mul(U256::from(Ratio::SCALE))
        .ok_or(MathError::Overflow)?;
    let raw = u64::try_from(scaled / den).unwrap_or(u64::MAX);
    Ok(Ratio::from_raw(raw))
}

/// `amount_in * (10000 - fee_bps) / 10000`, truncated
pub fn amount_in_after_fee(amount_in: u128, fee_bps: u32) -> Result<u128, MathError> {
    if fee_bps >= BPS_DENOMINATOR {
        return Err(MathError::InvalidFee(fee_bps));
    }
    let retained = U256::from(amount_in)
        .checked_mul(U256::from(BPS_DENOMINATOR - fee_bps))
        .ok_or(MathError::Overflow)?;
    to_u128(retained / U256::from(BPS_DENOMINATOR))
}

/// Output of a single constant-product swap with the fee taken on the input side:
///
/// ```text
/// amountInAfterFee = amountIn * (10000 - feeBps) / 10000
/// amountOut        = reserveOut - (reserveIn * reserveOut) / (reserveIn + amountInAfterFee)
/// ```
///
/// Returns `Ok(0)` when the fee-adjusted input truncates to nothing; callers
/// treat a zero output as an unusable hop.
pub fn get_amount_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee_bps: u32,
) -> Result<u128, MathError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(MathError::ZeroReserve);
    }
    if amount_in == 0 {
        return Err(MathError::ZeroInput);
    }

    let after_fee = U256::from(amount_in_after_fee(amount_in, fee_bps)?);
    let reserve_in = U256::from(reserve_in);
    let reserve_out = U256::from(reserve_out);

    let k = reserve_in.checked_mul(reserve_out).ok_or(MathError::Overflow)?;
    let new_reserve_in = reserve_in.checked_add(after_fee).ok_or(MathError::Overflow)?;
    // new_reserve_in >= reserve_in, so k / new_reserve_in <= reserve_out
    let new_reserve_out = k / new_reserve_in;

    to_u128(reserve_out - new_reserve_out)
}

/// Price impact of one hop: `1 - executionPrice / spotPriceBeforeTrade`.
///
/// Execution price is measured against the fee-adjusted input, so the pool
/// fee is not double counted as impact. Floored at zero when integer
/// truncation rounds the output in the trader's favour.
pub fn hop_price_impact(
    amount_in_after_fee: u128,
    amount_out: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<Ratio, MathError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(MathError::ZeroReserve);
    }
    if amount_in_after_fee == 0 {
        return Err(MathError::ZeroInput);
    }

    // (amountOut / amountIn) / (reserveOut / reserveIn)
    let num = U256::from(amount_out)
        .checked_mul(U256::from(reserve_in))
        .ok_or(MathError::Overflow)?;
    let den = U256::from(amount_in_after_fee)
        .checked_mul(U256::from(reserve_out))
        .ok_or(MathError::Overflow)?;

    let execution_over_spot = ratio_from_fraction(num, den)?;
    Ok(execution_over_spot.min(Ratio::ONE).complement())
}

/// Trade size as a fraction of the input-side reserve. Callers pass the
/// fee-adjusted input, the part that actually moves the curve.
pub fn depth_ratio(amount_in: u128, reserve_in: u128) -> Result<Ratio, MathError> {
    if reserve_in == 0 {
        return Err(MathError::ZeroReserve);
    }
    ratio_from_fraction(U256::from(amount_in), U256::from(reserve_in))
}
