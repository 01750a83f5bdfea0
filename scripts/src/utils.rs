//! Helpers for rendering on-chain values

use alloy::primitives::{utils::format_units, U256};
use chrono::DateTime;

use crate::{errors::ScriptError, types::CurrencyUnit};

/// The calendar format used for crowdsale start and end times
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Render a timestamp in seconds since the epoch as a UTC calendar date.
///
/// Values that do not fit a calendar date are shown raw.
pub fn format_timestamp(raw: U256) -> String {
    u64::try_from(raw)
        .ok()
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| format!("{} (out of range)", raw))
}

/// Render an amount in the currency's smallest unit in its display unit
pub fn format_currency(amount: U256, unit: &CurrencyUnit) -> Result<String, ScriptError> {
    format_units(amount, unit.decimals).map_err(|e| ScriptError::Conversion(e.to_string()))
}
