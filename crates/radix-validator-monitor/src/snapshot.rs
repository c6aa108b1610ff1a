//! The validator snapshot value type and stake scaling helpers.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::number;

/// Fixed-point scale of on-ledger token amounts (18 decimals).
pub const ATTOS_PER_TOKEN: f64 = 1e18;

/// Everything observed about the validator in one fetch cycle.
///
/// Built fresh every cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorSnapshot {
    /// Delegated stake in whole tokens.
    #[serde(deserialize_with = "number::f64")]
    pub stake: f64,
    /// Uptime percentage in `[0, 100]`.
    #[serde(deserialize_with = "number::f64")]
    pub uptime: f64,
    #[serde(alias = "proposals", deserialize_with = "number::u64")]
    pub proposals_completed: u64,
    #[serde(deserialize_with = "number::u64")]
    pub proposals_missed: u64,
    /// 1-based index of the validator in the upstream list.
    #[serde(deserialize_with = "number::u32")]
    pub position_in_set: u32,
    /// Delegations with nonzero remaining stake.
    #[serde(default, deserialize_with = "number::u64")]
    pub staker_count: u64,
}

/// Convert an attos amount string (e.g. `"1500000000000000000"`) into whole tokens.
pub fn scale_attos(raw: &str) -> Result<f64, MonitorError> {
    let attos: u128 = raw
        .trim()
        .parse()
        .map_err(|_| MonitorError::Upstream(format!("invalid token amount {raw:?}")))?;
    Ok(attos as f64 / ATTOS_PER_TOKEN)
}

/// Whether an attos amount string is zero.
pub fn is_zero_attos(raw: &str) -> Result<bool, MonitorError> {
    Ok(scale_attos(raw)? == 0.0)
}

/// Render a value with an SI prefix and two decimals, e.g. `1.23 M`.
pub fn si_format(value: f64) -> String {
    const PREFIXES: [(f64, &str); 5] = [
        (1e15, "P"),
        (1e12, "T"),
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
    ];
    for (scale, prefix) in PREFIXES {
        if value.abs() >= scale {
            return format!("{:.2} {}", value / scale, prefix);
        }
    }
    format!("{value:.2}")
}
