//! Checked 18-decimal fixed-point arithmetic on u128.
//!
//! Every multiply that can outgrow u128 goes through a 128x128 -> 256-bit
//! product followed by a 256/128 long division, so the only failure mode is
//! an explicit `MathOverflow` and never a silent wraparound.

use crate::error::EngineError;

/// Working precision of the engine: 18 fractional digits.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Native precision of the price feeds: 8 fractional digits.
pub const FEED_PRECISION: u128 = 100_000_000;

/// Scale factor lifting a feed price to working precision.
pub const ADDITIONAL_FEED_PRECISION: u128 = PRECISION / FEED_PRECISION;

pub fn checked_add(a: u128, b: u128) -> Result<u128, EngineError> {
    a.checked_add(b).ok_or(EngineError::MathOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, EngineError> {
    a.checked_sub(b).ok_or(EngineError::MathOverflow)
}

/// Computes `a * b / denom` with a 256-bit intermediate, rounding down.
///
/// Fails with `MathOverflow` when `denom == 0` or the quotient does not fit
/// in u128.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128, EngineError> {
    if denom == 0 {
        return Err(EngineError::MathOverflow);
    }
    let (hi, lo) = full_mul(a, b);
    div_wide(hi, lo, denom).ok_or(EngineError::MathOverflow)
}

/// 128x128 -> 256 multiplication via 64-bit limbs.
/// Returns the product as a (high, low) u128 pair.
fn full_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = (1u128 << 64) - 1;

    let a_lo = a & MASK;
    let a_hi = a >> 64;
    let b_lo = b & MASK;
    let b_hi = b >> 64;

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let (mid, mid_carry) = lh.overflowing_add(hl);
    let (lo, lo_carry) = ll.overflowing_add(mid << 64);
    let hi = hh + (mid >> 64) + ((mid_carry as u128) << 64) + lo_carry as u128;

    (hi, lo)
}

/// Divides the 256-bit value `(hi, lo)` by `divisor`.
/// Returns `None` when the quotient exceeds u128.
fn div_wide(hi: u128, lo: u128, divisor: u128) -> Option<u128> {
    if hi >= divisor {
        // Quotient needs more than 128 bits.
        return None;
    }
    if hi == 0 {
        return Some(lo / divisor);
    }

    // Binary long division, shifting in one bit of `lo` per step. The
    // remainder stays below `divisor` so a single conditional subtraction
    // per step is enough; the shifted-out top bit is folded back in via
    // the wrap-around subtraction.
    let mut rem = hi;
    let mut quo = 0u128;
    for i in (0..128).rev() {
        let top_bit = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        if top_bit == 1 || rem >= divisor {
            rem = rem.wrapping_sub(divisor);
            quo |= 1 << i;
        }
    }
    Some(quo)
}
