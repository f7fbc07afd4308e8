//! Address validation for the score route.
//!
//! The rule is a literal `0x` prefix check. Length, hex digits and checksum
//! casing are left to the scoring provider.

use thiserror::Error;

/// Required address prefix, compared case-sensitively.
pub const ADDRESS_PREFIX: &str = "0x";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("address does not start with 0x")]
    MissingPrefix,
}

/// Check an address segment extracted by the router.
pub fn validate_address(address: &str) -> Result<(), AddressError> {
    if address.is_empty() {
        return Err(AddressError::Empty);
    }
    if !address.starts_with(ADDRESS_PREFIX) {
        return Err(AddressError::MissingPrefix);
    }
    Ok(())
}
