//! Decimal amount conversion.
//!
//! The node and the surrounding wallet exchange amounts as decimal strings
//! in whole coins (e.g. `"12.5"`). Inside the driver every amount is an
//! integer in the smallest unit, scaled by `10^decimals`.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::constants::MAX_DECIMALS;
use crate::error::{AmountError, CodecError};

/// Parse a decimal coin amount into smallest units.
///
/// Accepts `"5"`, `"5."`, `"0.25"`, `".5"`. Rejects signs, exponents,
/// separators and more fractional digits than `decimals`.
pub fn parse_amount(text: &str, decimals: u32) -> Result<BigUint, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::ScaleTooLarge(decimals));
    }
    let text = text.trim();
    if text.is_empty() || text == "." {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if let Some(bad) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(bad.to_string()));
    }
    if frac.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            got: frac.len(),
            max: decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(frac);
    for _ in frac.len()..decimals as usize {
        digits.push('0');
    }

    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| AmountError::InvalidCharacter(text.to_string()))
}

/// Render smallest units as a decimal coin amount, trimming trailing
/// fractional zeros.
pub fn format_amount(value: &BigUint, decimals: u32) -> String {
    let digits = value.to_str_radix(10);
    if decimals == 0 {
        return digits;
    }
    let scale = decimals as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - scale);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

/// Narrow an amount to the `u64` width of the transaction encoding.
pub fn to_wire(value: &BigUint, field: &'static str) -> Result<u64, CodecError> {
    value
        .to_u64()
        .ok_or_else(|| CodecError::ValueOutOfRange(format!("{field} = {value}")))
}
