//! Fetching and rendering the status of the crowdsale

use alloy::primitives::U256;
use tracing::debug;

use crate::{
    chain::CrowdsaleChain,
    errors::ScriptError,
    types::{state_name, CurrencyUnit},
    utils::{format_currency, format_timestamp},
};

/// A snapshot of the crowdsale's on-chain state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrowdsaleStatus {
    /// The token's total supply, unscaled
    pub total_supply: U256,
    /// The raw lifecycle ordinal
    pub state: u8,
    /// Start time, in seconds since the epoch
    pub starts_at: U256,
    /// End time, in seconds since the epoch
    pub ends_at: U256,
    /// Funds raised, in the currency's smallest unit
    pub wei_raised: U256,
    /// Tokens sold, unscaled
    pub tokens_sold: U256,
}

/// Read the crowdsale status, one contract call per field
pub async fn fetch_status(chain: &impl CrowdsaleChain) -> Result<CrowdsaleStatus, ScriptError> {
    let status = CrowdsaleStatus {
        total_supply: chain.total_supply().await?,
        state: chain.crowdsale_state().await?,
        starts_at: chain.starts_at().await?,
        ends_at: chain.ends_at().await?,
        wei_raised: chain.wei_raised().await?,
        tokens_sold: chain.tokens_sold().await?,
    };
    debug!(?status, "fetched crowdsale status");

    Ok(status)
}

impl CrowdsaleStatus {
    /// The human readable name of the lifecycle state
    pub fn state_label(&self) -> String {
        let name = state_name(self.state.into());
        match self.state {
            0..=7 => name.to_string(),
            ordinal => format!("{} ({})", name, ordinal),
        }
    }

    /// Render the status as labeled lines, raised funds in `unit`
    pub fn render(&self, unit: &CurrencyUnit) -> Result<Vec<String>, ScriptError> {
        Ok(vec![
            format!("token supply: {}", self.total_supply),
            format!("crowdsale state: {}", self.state_label()),
            format!("crowdsale start date: {}", format_timestamp(self.starts_at)),
            format!("crowdsale end date: {}", format_timestamp(self.ends_at)),
            format!(
                "{} raised: {}",
                unit.symbol,
                format_currency(self.wei_raised, unit)?
            ),
            format!("tokens sold: {}", self.tokens_sold),
        ])
    }
}
