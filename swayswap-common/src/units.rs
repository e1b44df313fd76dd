//! Conversions between human readable decimal strings and base unit amounts.
//!
//! Amounts on the exchange contract are unsigned 64 bit integers expressed in the
//! asset's smallest unit. A coin with `decimals = 9` represents `1.5` as
//! `1_500_000_000`.
use thiserror::Error;

use crate::models::Amount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid character in amount: {0}")]
    InvalidDigit(String),

    #[error("Amount {value} has more than {decimals} decimals")]
    TooManyDecimals { value: String, decimals: u32 },

    #[error("Amount {0} does not fit into 64 bits")]
    Overflow(String),
}

/// Parses a decimal string such as `"1.25"` into base units.
pub fn parse_units(value: &str, decimals: u32) -> Result<Amount, UnitsError> {
    let value = value.trim();
    if value.is_empty() || value == "." {
        return Err(UnitsError::Empty);
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if !whole
        .chars()
        .chain(fraction.chars())
        .all(|c| c.is_ascii_digit())
    {
        return Err(UnitsError::InvalidDigit(value.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals { value: value.to_string(), decimals });
    }

    let digits = format!(
        "{whole}{fraction:0<width$}",
        whole = if whole.is_empty() { "0" } else { whole },
        width = decimals as usize
    );
    digits
        .parse::<Amount>()
        .map_err(|_| UnitsError::Overflow(value.to_string()))
}

/// Formats base units as a decimal string.
///
/// Trailing zeros of the fractional part are dropped but at least one fractional
/// digit is kept, so `format_units(1_000_000_000, 9) == "1.0"`.
pub fn format_units(value: Amount, decimals: u32) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return format!("{digits}.0");
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}
