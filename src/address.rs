//! Address validation and EIP-55 checksum normalization

use crate::error::{EngineError, Result};
use alloy::primitives::Address;

/// Validates raw address strings and normalizes them to checksummed form
///
/// Accepted input: `0x` followed by 40 hex digits, surrounding whitespace
/// ignored. All-lowercase and all-uppercase digits carry no checksum and are
/// accepted as-is; mixed case must match the EIP-55 checksum.
pub struct AddressCodec;

impl AddressCodec {
    /// Parse and validate a raw address
    pub fn normalize(raw: &str) -> Result<Address> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| invalid(raw, "missing 0x prefix"))?;

        if digits.len() != 40 {
            return Err(invalid(
                raw,
                format!("expected 40 hex digits, got {}", digits.len()),
            ));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid(raw, "non-hex character"));
        }

        let address: Address = digits.parse().map_err(|e| invalid(raw, e))?;

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum(None)[2..] != *digits {
            return Err(invalid(raw, "checksum mismatch"));
        }

        Ok(address)
    }

    /// Checksummed representation of an already-parsed address
    pub fn checksum(address: &Address) -> String {
        address.to_checksum(None)
    }

    pub fn is_valid(raw: &str) -> bool {
        Self::normalize(raw).is_ok()
    }
}

fn invalid(raw: &str, reason: impl ToString) -> EngineError {
    EngineError::InvalidAddress {
        input: raw.to_string(),
        reason: reason.to_string(),
    }
}
