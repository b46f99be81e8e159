//! Unit conversion between wei, gwei and ether
//!
//! Conversions go through alloy's decimal string parser rather than float
//! multiplication, so sub-0.01 ether amounts keep every significant digit.

use crate::{Error, Result};
use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;

/// Decimals of the display unit (ether)
pub const ETHER_DECIMALS: u8 = 18;
/// Decimals of the intermediate unit (gwei)
pub const GWEI_DECIMALS: u8 = 9;

/// Fractional digits shown for ether amounts
const DISPLAY_PRECISION: usize = 6;
/// Fractional digits shown for gwei amounts
const INTERMEDIATE_PRECISION: usize = 9;

/// Convert an ether amount to wei.
///
/// The value is first rendered as an exact decimal with 18 fractional
/// digits, then parsed with arbitrary precision. Anything past the 18th
/// digit is rounded away by the rendering step.
pub fn to_smallest_unit(display_amount: f64) -> Result<U256> {
    if !display_amount.is_finite() || display_amount < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "amount must be a finite non-negative number, got {}",
            display_amount
        )));
    }

    let rendered = format!("{:.*}", ETHER_DECIMALS as usize, display_amount);
    let parsed = parse_units(&rendered, ETHER_DECIMALS)
        .map_err(|e| Error::InvalidArgument(format!("Invalid amount {}: {}", rendered, e)))?;

    Ok(parsed.get_absolute())
}

/// Format wei as ether with 6 fractional digits (truncated)
pub fn to_display_unit(wei: U256) -> String {
    format_fixed(wei, ETHER_DECIMALS, DISPLAY_PRECISION)
}

/// Format wei as gwei with 9 fractional digits
pub fn to_intermediate_unit(wei: U256) -> String {
    format_fixed(wei, GWEI_DECIMALS, INTERMEDIATE_PRECISION)
}

fn format_fixed(value: U256, decimals: u8, precision: usize) -> String {
    // format_units only fails on an invalid unit, and both units here are constants
    let full = format_units(value, decimals).unwrap_or_else(|_| value.to_string());

    let (whole, fraction) = full.split_once('.').unwrap_or((full.as_str(), ""));
    let mut fraction: String = fraction.chars().take(precision).collect();
    while fraction.len() < precision {
        fraction.push('0');
    }

    format!("{}.{}", whole, fraction)
}

/// Abbreviate an address for display as `first6...last4`
pub fn shorten_address(address: &str) -> String {
    let len = address.chars().count();
    if len < 10 {
        return address.to_string();
    }

    let head: String = address.chars().take(6).collect();
    let tail: String = address.chars().skip(len - 4).collect();
    format!("{}...{}", head, tail)
}
