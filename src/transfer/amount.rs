//! Decimal amount parsing.
//!
//! Amounts arrive as decimal text ("1.5", "250", ".25") and are converted to the
//! integer base units of the asset. Only plain positive decimals are accepted:
//! no signs, no exponents, no separators.

use alloy::primitives::utils::parse_units;
use alloy::primitives::U256;
use thiserror::Error;

/// Decimal precision of native value (wei per ether).
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is required")]
    Empty,

    #[error("Amount '{0}' is not a positive decimal number")]
    Malformed(String),

    #[error("Amount must be greater than zero")]
    Zero,

    #[error("Amount '{amount}' has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },

    #[error("Amount '{0}' is too large")]
    Overflow(String),
}

/// Check that `amount` is a well-formed positive decimal, independent of precision.
///
/// Returns the normalized text (trimmed, leading `.` expanded to `0.`).
pub fn validate_amount(amount: &str) -> Result<String, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let well_formed = match fraction {
        Some(fraction) => !fraction.is_empty() && digits(whole) && digits(fraction),
        None => !whole.is_empty() && digits(whole),
    };
    if !well_formed {
        return Err(AmountError::Malformed(amount.to_string()));
    }

    let nonzero = amount.bytes().any(|b| (b'1'..=b'9').contains(&b));
    if !nonzero {
        return Err(AmountError::Zero);
    }

    if whole.is_empty() {
        Ok(format!("0{}", amount))
    } else {
        Ok(amount.to_string())
    }
}

/// Number of digits after the decimal point.
pub fn fractional_digits(amount: &str) -> usize {
    amount
        .split_once('.')
        .map(|(_, fraction)| fraction.len())
        .unwrap_or(0)
}

/// Convert a decimal amount into base units with `decimals` of precision.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let normalized = validate_amount(amount)?;

    if fractional_digits(&normalized) > decimals as usize {
        return Err(AmountError::TooPrecise {
            amount: normalized,
            decimals,
        });
    }

    parse_units(&normalized, decimals)
        .map(|units| units.get_absolute())
        .map_err(|_| AmountError::Overflow(normalized))
}
