//! Token amount types and fixed-point conversions.

use alloy::primitives::{Address, U256};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::ethereum::constants::TOKEN_DECIMALS;

/// A balance as read from the chain, with display renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    /// Account holding the balance.
    pub holder: String,
    /// Token or native currency symbol.
    pub symbol: String,
    /// Human-readable balance with trailing zeros trimmed.
    pub balance: String,
    /// Balance rounded to the panel's display precision.
    pub display: String,
    /// Raw balance in smallest unit.
    pub balance_raw: String,
}

impl BalanceView {
    /// Render an 18-decimal balance with `places` fractional digits.
    pub fn new(holder: Address, symbol: impl Into<String>, raw: U256, places: u32) -> Self {
        Self {
            holder: format!("{holder:?}"),
            symbol: symbol.into(),
            balance: format_units(raw, TOKEN_DECIMALS),
            display: format_fixed(raw, TOKEN_DECIMALS, places),
            balance_raw: raw.to_string(),
        }
    }
}

/// Format a U256 value with decimals to a human-readable string.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value == U256::ZERO {
        return "0".to_string();
    }

    let value_str = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return value_str;
    }

    let len = value_str.len();
    if len <= decimals {
        // Value is less than 1, pad with zeros
        let zeros = decimals - len;
        let decimal_part = value_str.trim_end_matches('0');
        format!("0.{}{}", "0".repeat(zeros), decimal_part)
    } else {
        let (integer, decimal) = value_str.split_at(len - decimals);
        let decimal = decimal.trim_end_matches('0');
        if decimal.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, decimal)
        }
    }
}

/// Format a U256 value rounded to a fixed number of fractional digits.
///
/// Values too large for `Decimal` fall back to [`format_units`].
pub fn format_fixed(value: U256, decimals: u8, places: u32) -> String {
    let formatted = format_units(value, decimals);
    match formatted.parse::<Decimal>() {
        Ok(d) => {
            let rounded = d.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", places as usize, rounded)
        }
        Err(_) => formatted,
    }
}

/// Parse a human-readable amount string to U256 with decimals.
///
/// Only plain decimal notation is accepted. More fractional digits than
/// `decimals` is an error rather than a silent truncation.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, String> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }

    if amount.starts_with('-') {
        return Err("Amount cannot be negative".to_string());
    }

    let decimals = decimals as usize;
    let (integer, fraction) = match amount.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (amount, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !is_digits(integer) || !is_digits(fraction)
    {
        return Err(format!("Invalid amount: {}", amount));
    }

    if fraction.len() > decimals {
        return Err(format!("Amount has more than {} decimal places", decimals));
    }

    let integer_value = if integer.is_empty() {
        U256::ZERO
    } else {
        integer.parse::<U256>().map_err(|e| format!("Invalid integer part: {}", e))?
    };

    let padded = format!("{}{}", fraction, "0".repeat(decimals - fraction.len()));
    let fraction_value = if padded.is_empty() {
        U256::ZERO
    } else {
        padded.parse::<U256>().map_err(|e| format!("Invalid fraction part: {}", e))?
    };

    let multiplier = U256::from(10).pow(U256::from(decimals));
    integer_value
        .checked_mul(multiplier)
        .and_then(|scaled| scaled.checked_add(fraction_value))
        .ok_or_else(|| "Amount is too large".to_string())
}

/// Parse an 18-decimal token amount (the `parseEther` convention).
pub fn parse_ether(amount: &str) -> Result<U256, String> {
    parse_units(amount, TOKEN_DECIMALS)
}
