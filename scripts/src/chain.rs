//! The contract calls the scripts make, behind a trait so that the reporter
//! and the setup sequence can run against an in-memory chain in tests

use alloy::primitives::{Address, TxHash, U256};

use crate::{
    errors::ScriptError,
    types::{AgentAddress, ConfirmationPolicy, TxConfirmation},
};

/// Read and write access to the token, crowdsale, and finalize agent contracts
#[allow(async_fn_in_trait)]
pub trait CrowdsaleChain {
    /// The address of the token contract
    fn token_address(&self) -> Address;
    /// The address of the crowdsale contract
    fn crowdsale_address(&self) -> Address;
    /// The address of the finalize agent contract
    fn finalize_agent_address(&self) -> Address;

    // --- Reads --- //

    /// The token's total supply, in its smallest unit
    async fn total_supply(&self) -> Result<U256, ScriptError>;
    /// The raw lifecycle ordinal of the crowdsale
    async fn crowdsale_state(&self) -> Result<u8, ScriptError>;
    /// The crowdsale start time, in seconds since the epoch
    async fn starts_at(&self) -> Result<U256, ScriptError>;
    /// The crowdsale end time, in seconds since the epoch
    async fn ends_at(&self) -> Result<U256, ScriptError>;
    /// The funds raised, in the smallest unit of the chain's currency
    async fn wei_raised(&self) -> Result<U256, ScriptError>;
    /// The number of tokens sold, in the token's smallest unit
    async fn tokens_sold(&self) -> Result<U256, ScriptError>;
    /// The token's release agent
    async fn release_agent(&self) -> Result<AgentAddress, ScriptError>;
    /// The crowdsale's finalize agent
    async fn finalize_agent(&self) -> Result<AgentAddress, ScriptError>;
    /// Whether `addr` may mint tokens
    async fn is_mint_agent(&self, addr: Address) -> Result<bool, ScriptError>;

    // --- Writes --- //

    /// Submit `token.setReleaseAgent(agent)`
    async fn set_release_agent(&self, agent: Address) -> Result<TxHash, ScriptError>;
    /// Submit `crowdsale.setFinalizeAgent(agent)`
    async fn set_finalize_agent(&self, agent: Address) -> Result<TxHash, ScriptError>;
    /// Submit `token.setMintAgent(agent, enabled)`
    async fn set_mint_agent(&self, agent: Address, enabled: bool) -> Result<TxHash, ScriptError>;

    /// Wait for a submitted transaction to reach the policy's confirmation depth
    async fn confirm(
        &self,
        tx_hash: TxHash,
        policy: &ConfirmationPolicy,
    ) -> Result<TxConfirmation, ScriptError>;
}
