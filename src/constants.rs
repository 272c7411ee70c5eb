//! Constants and unit conversion for the transaction engine

use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use eyre::{ensure, Context, Result};
use std::time::Duration;

/// Native asset has 18 decimals (wei -> ether)
pub const NATIVE_DECIMALS: u8 = 18;

/// Protocol-fixed gas cost of a plain value transfer
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// Gas limit = ceil(estimate * 6 / 5), i.e. a 20% buffer
pub const GAS_BUFFER_NUMERATOR: u64 = 6;
pub const GAS_BUFFER_DENOMINATOR: u64 = 5;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Shortest receipt polling period; a zero period is not a valid interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Apply the safety buffer to a gas estimate, rounding up.
///
/// Saturates at `u64::MAX`, which no node would accept anyway.
pub fn apply_gas_buffer(estimate: u64) -> u64 {
    let numerator = estimate as u128 * GAS_BUFFER_NUMERATOR as u128;
    let denominator = GAS_BUFFER_DENOMINATOR as u128;
    let limit = numerator.div_ceil(denominator);
    u64::try_from(limit).unwrap_or(u64::MAX)
}

/// Format a wei amount in the display unit (e.g. "1.500000000000000000")
pub fn format_native(wei: U256) -> String {
    // 18 decimals is always a valid unit
    format_units(wei, NATIVE_DECIMALS).unwrap_or_else(|_| wei.to_string())
}

/// Parse a display-unit amount (e.g. "0.1") into wei
pub fn parse_native(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    ensure!(!amount.starts_with('-'), "Amount must not be negative: {amount}");
    let parsed = parse_units(amount, NATIVE_DECIMALS)
        .with_context(|| format!("Invalid native amount: {amount}"))?;
    Ok(parsed.get_absolute())
}
