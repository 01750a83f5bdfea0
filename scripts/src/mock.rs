//! An in-memory crowdsale chain that records every call made against it

use std::{collections::HashSet, sync::Mutex};

use alloy::primitives::{Address, TxHash, U256};

use crate::{
    chain::CrowdsaleChain,
    errors::ScriptError,
    types::{AgentAddress, ConfirmationPolicy, TxConfirmation},
};

/// A write submitted to the mock, applied once it is confirmed
#[derive(Debug, Clone, Copy)]
enum PendingWrite {
    /// `token.setReleaseAgent`
    ReleaseAgent(Address),
    /// `crowdsale.setFinalizeAgent`
    FinalizeAgent(Address),
    /// `token.setMintAgent`
    MintAgent(Address, bool),
}

/// The mutable state of the mock chain
#[derive(Default)]
struct MockState {
    total_supply: U256,
    state: u8,
    starts_at: U256,
    ends_at: U256,
    wei_raised: U256,
    tokens_sold: U256,
    release_agent: Address,
    finalize_agent: Address,
    mint_agents: HashSet<Address>,
    pending: Vec<(TxHash, PendingWrite)>,
    reads: Vec<&'static str>,
    writes: Vec<&'static str>,
    fail_on: Option<&'static str>,
    time_out_confirmations: bool,
}

/// A crowdsale chain held in memory
pub struct MockChain {
    token: Address,
    crowdsale: Address,
    finalize_agent: Address,
    state: Mutex<MockState>,
}

impl MockChain {
    /// A chain on which none of the setup steps have run
    pub fn unconfigured() -> Self {
        Self {
            token: Address::repeat_byte(0x01),
            crowdsale: Address::repeat_byte(0x02),
            finalize_agent: Address::repeat_byte(0x03),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Point the token's release agent at `agent`
    pub fn with_release_agent(self, agent: Address) -> Self {
        self.lock().release_agent = agent;
        self
    }

    /// Point the crowdsale's finalize agent at `agent`
    pub fn with_finalize_agent(self, agent: Address) -> Self {
        self.lock().finalize_agent = agent;
        self
    }

    /// Set the crowdsale's raw lifecycle ordinal
    pub fn with_state(self, state: u8) -> Self {
        self.lock().state = state;
        self
    }

    /// Set the reported sale figures
    pub fn with_figures(
        self,
        total_supply: u64,
        starts_at: u64,
        ends_at: u64,
        wei_raised: u64,
        tokens_sold: u64,
    ) -> Self {
        {
            let mut state = self.lock();
            state.total_supply = U256::from(total_supply);
            state.starts_at = U256::from(starts_at);
            state.ends_at = U256::from(ends_at);
            state.wei_raised = U256::from(wei_raised);
            state.tokens_sold = U256::from(tokens_sold);
        }
        self
    }

    /// Fail every call of the named method
    pub fn failing_on(self, method: &'static str) -> Self {
        self.lock().fail_on = Some(method);
        self
    }

    /// Never confirm submitted transactions
    pub fn timing_out(self) -> Self {
        self.lock().time_out_confirmations = true;
        self
    }

    /// The reads made so far, in order
    pub fn reads(&self) -> Vec<&'static str> {
        self.lock().reads.clone()
    }

    /// The writes submitted so far, in order
    pub fn writes(&self) -> Vec<&'static str> {
        self.lock().writes.clone()
    }

    /// Forget the recorded calls
    pub fn clear_calls(&self) {
        let mut state = self.lock();
        state.reads.clear();
        state.writes.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mutex poisoned")
    }

    /// Record a read, failing if the method is configured to fail
    fn read(&self, method: &'static str) -> Result<std::sync::MutexGuard<'_, MockState>, ScriptError> {
        let mut state = self.lock();
        state.reads.push(method);
        if state.fail_on == Some(method) {
            return Err(ScriptError::ContractQuery(format!("{}: mock failure", method)));
        }
        Ok(state)
    }

    /// Record a write and queue it until confirmation
    fn write(&self, method: &'static str, write: PendingWrite) -> Result<TxHash, ScriptError> {
        let mut state = self.lock();
        state.writes.push(method);
        if state.fail_on == Some(method) {
            return Err(ScriptError::ContractInteraction(format!(
                "{}: mock failure",
                method
            )));
        }

        let tx_hash = TxHash::with_last_byte(state.writes.len() as u8);
        state.pending.push((tx_hash, write));
        Ok(tx_hash)
    }
}

impl CrowdsaleChain for MockChain {
    fn token_address(&self) -> Address {
        self.token
    }

    fn crowdsale_address(&self) -> Address {
        self.crowdsale
    }

    fn finalize_agent_address(&self) -> Address {
        self.finalize_agent
    }

    async fn total_supply(&self) -> Result<U256, ScriptError> {
        Ok(self.read("totalSupply")?.total_supply)
    }

    async fn crowdsale_state(&self) -> Result<u8, ScriptError> {
        Ok(self.read("getState")?.state)
    }

    async fn starts_at(&self) -> Result<U256, ScriptError> {
        Ok(self.read("startsAt")?.starts_at)
    }

    async fn ends_at(&self) -> Result<U256, ScriptError> {
        Ok(self.read("endsAt")?.ends_at)
    }

    async fn wei_raised(&self) -> Result<U256, ScriptError> {
        Ok(self.read("weiRaised")?.wei_raised)
    }

    async fn tokens_sold(&self) -> Result<U256, ScriptError> {
        Ok(self.read("tokensSold")?.tokens_sold)
    }

    async fn release_agent(&self) -> Result<AgentAddress, ScriptError> {
        Ok(self.read("releaseAgent")?.release_agent.into())
    }

    async fn finalize_agent(&self) -> Result<AgentAddress, ScriptError> {
        Ok(self.read("finalizeAgent")?.finalize_agent.into())
    }

    async fn is_mint_agent(&self, addr: Address) -> Result<bool, ScriptError> {
        Ok(self.read("mintAgents")?.mint_agents.contains(&addr))
    }

    async fn set_release_agent(&self, agent: Address) -> Result<TxHash, ScriptError> {
        self.write("setReleaseAgent", PendingWrite::ReleaseAgent(agent))
    }

    async fn set_finalize_agent(&self, agent: Address) -> Result<TxHash, ScriptError> {
        self.write("setFinalizeAgent", PendingWrite::FinalizeAgent(agent))
    }

    async fn set_mint_agent(&self, agent: Address, enabled: bool) -> Result<TxHash, ScriptError> {
        self.write("setMintAgent", PendingWrite::MintAgent(agent, enabled))
    }

    async fn confirm(
        &self,
        tx_hash: TxHash,
        policy: &ConfirmationPolicy,
    ) -> Result<TxConfirmation, ScriptError> {
        let mut state = self.lock();
        if state.time_out_confirmations {
            return Err(ScriptError::ConfirmationTimeout {
                tx_hash,
                timeout: policy.timeout,
            });
        }

        let idx = state
            .pending
            .iter()
            .position(|(hash, _)| *hash == tx_hash)
            .ok_or_else(|| ScriptError::Confirmation(format!("unknown tx {:#x}", tx_hash)))?;
        let (_, write) = state.pending.remove(idx);
        match write {
            PendingWrite::ReleaseAgent(agent) => state.release_agent = agent,
            PendingWrite::FinalizeAgent(agent) => state.finalize_agent = agent,
            PendingWrite::MintAgent(agent, true) => {
                state.mint_agents.insert(agent);
            }
            PendingWrite::MintAgent(agent, false) => {
                state.mint_agents.remove(&agent);
            }
        }

        Ok(TxConfirmation {
            tx_hash,
            block_number: Some(1),
            gas_used: 21_000,
            success: true,
        })
    }
}
