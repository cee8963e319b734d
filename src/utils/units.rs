//! Fixed-point to float conversion for raw on-chain amounts
//!
//! Token contracts report integer quantities scaled by `10^decimals`. The
//! conversion here splits the digit string at the decimal point instead of
//! dividing a (possibly huge) integer by a float power of ten.

use crate::errors::UnitsError;

/// Largest decimals value a uint256 amount can meaningfully carry
pub const MAX_DECIMALS: u32 = 77;

/// Convert a raw decimal integer string into a float amount
///
/// A leading `-` is accepted so netted figures (supply minus reserves) can be
/// converted too.
///
/// # Examples
/// ```
/// use pegged_supply::utils::units::scale_raw_amount;
///
/// assert_eq!(scale_raw_amount("1500000", 6).unwrap(), 1.5);
/// assert_eq!(scale_raw_amount("42", 0).unwrap(), 42.0);
/// assert_eq!(scale_raw_amount("5", 3).unwrap(), 0.005);
/// ```
pub fn scale_raw_amount(raw: &str, decimals: u32) -> Result<f64, UnitsError> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    if digits.is_empty() {
        return Err(UnitsError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UnitsError::InvalidDigit(raw.to_string()));
    }
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::UnsupportedDecimals(decimals));
    }

    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits.to_string()
    };
    let split = padded.len() - decimals;
    let literal = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        &padded[..split],
        if decimals == 0 { "0" } else { &padded[split..] }
    );

    let value: f64 = literal
        .parse()
        .map_err(|_| UnitsError::InvalidDigit(raw.to_string()))?;
    if !value.is_finite() {
        return Err(UnitsError::NonFinite(raw.to_string()));
    }
    Ok(value)
}

/// Convert a signed raw integer into a float amount
pub fn scale_raw_i128(raw: i128, decimals: u32) -> Result<f64, UnitsError> {
    scale_raw_amount(&raw.to_string(), decimals)
}

/// Parse a `0x`-prefixed JSON-RPC quantity (or 32-byte ABI word)
///
/// # Examples
/// ```
/// use pegged_supply::utils::units::hex_quantity_to_u128;
///
/// assert_eq!(hex_quantity_to_u128("0x0").unwrap(), 0);
/// assert_eq!(hex_quantity_to_u128("0x12").unwrap(), 18);
/// ```
pub fn hex_quantity_to_u128(quantity: &str) -> Result<u128, UnitsError> {
    let body = quantity
        .trim()
        .strip_prefix("0x")
        .or_else(|| quantity.trim().strip_prefix("0X"))
        .ok_or_else(|| UnitsError::InvalidDigit(quantity.to_string()))?;

    if body.is_empty() {
        return Err(UnitsError::Empty);
    }
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(UnitsError::InvalidDigit(quantity.to_string()));
    }

    let significant = body.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    if significant.len() > 32 {
        return Err(UnitsError::Overflow(quantity.to_string()));
    }

    u128::from_str_radix(significant, 16).map_err(|_| UnitsError::Overflow(quantity.to_string()))
}
