//! Denomination conversion for call arguments quoted in ether.

use {
    alloy::primitives::{
        U256,
        utils::{ParseUnits, parse_units},
    },
    anyhow::{Context, Result, bail},
};

/// Converts an amount of ether into wei. Rejects negative and non-finite
/// amounts, and fractions finer than 18 decimals.
pub fn ether(amount: f64) -> Result<U256> {
    let wei = parse_units(&amount.to_string(), "ether")
        .with_context(|| format!("could not convert {amount} ether to wei"))?;
    match wei {
        ParseUnits::U256(wei) => Ok(wei),
        _ => bail!("ether amount must not be negative, got {amount}"),
    }
}
