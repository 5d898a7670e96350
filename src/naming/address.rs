//! Account address validation.

use alloy::primitives::Address;

/// Is `s` a textual account address: `0x` followed by 40 hex digits.
///
/// All-lowercase and all-uppercase digits are accepted as-is; mixed case must
/// carry a valid EIP-55 checksum.
pub fn is_valid_address(s: &str) -> bool {
    parse_address(s).is_some()
}

/// Parse `s` under the rules of [`is_valid_address`].
pub fn parse_address(s: &str) -> Option<Address> {
    let hex = s.strip_prefix("0x")?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(s, None).ok();
    }

    hex.parse().ok()
}

/// The all-zero sentinel that registries return for "no record".
pub fn is_zero_address(address: &Address) -> bool {
    address.is_zero()
}
