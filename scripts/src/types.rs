//! Type definitions used throughout the scripts

use std::{
    fmt::{self, Display},
    time::Duration,
};

use alloy::primitives::{Address, TxHash};

use crate::constants::{
    DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_CURRENCY_DECIMALS,
    DEFAULT_CURRENCY_SYMBOL, UNRECOGNIZED_STATE_LABEL,
};

/// The lifecycle state of a crowdsale, in the order the contract declares it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrowdsaleState {
    /// The default value of an unset state
    Unknown,
    /// Initialization calls and variables have not all been set yet
    Preparing,
    /// The start time has not been reached
    PreFunding,
    /// The sale is active
    Funding,
    /// The minimum funding goal was reached
    Success,
    /// The minimum funding goal was not reached before the end time
    Failure,
    /// Finalization was called and executed successfully
    Finalized,
    /// Refunds are loaded on the contract for reclaim
    Refunding,
}

impl CrowdsaleState {
    /// All states, indexed by their on-chain ordinal
    pub const ALL: [CrowdsaleState; 8] = [
        CrowdsaleState::Unknown,
        CrowdsaleState::Preparing,
        CrowdsaleState::PreFunding,
        CrowdsaleState::Funding,
        CrowdsaleState::Success,
        CrowdsaleState::Failure,
        CrowdsaleState::Finalized,
        CrowdsaleState::Refunding,
    ];

    /// Map an on-chain ordinal to a state, `None` if it is out of range
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }

    /// The name the contract uses for this state
    pub fn name(&self) -> &'static str {
        match self {
            CrowdsaleState::Unknown => "Unknown",
            CrowdsaleState::Preparing => "Preparing",
            CrowdsaleState::PreFunding => "PreFunding",
            CrowdsaleState::Funding => "Funding",
            CrowdsaleState::Success => "Success",
            CrowdsaleState::Failure => "Failure",
            CrowdsaleState::Finalized => "Finalized",
            CrowdsaleState::Refunding => "Refunding",
        }
    }
}

impl Display for CrowdsaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The name of the state with the given ordinal, or the unrecognized sentinel
pub fn state_name(ordinal: i64) -> &'static str {
    CrowdsaleState::from_ordinal(ordinal).map_or(UNRECOGNIZED_STATE_LABEL, |s| s.name())
}

/// An address-typed contract field that may not have been configured yet
///
/// Contracts store the zero address for an unset field, which is never a
/// valid agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentAddress {
    /// The field holds the zero address
    Unset,
    /// The field holds a real address
    Set(Address),
}

impl AgentAddress {
    /// Whether the field is set to exactly `addr`
    pub fn is(&self, addr: Address) -> bool {
        matches!(self, AgentAddress::Set(a) if *a == addr)
    }

    /// Whether the field holds the zero address
    pub fn is_unset(&self) -> bool {
        matches!(self, AgentAddress::Unset)
    }
}

impl From<Address> for AgentAddress {
    fn from(addr: Address) -> Self {
        if addr.is_zero() {
            AgentAddress::Unset
        } else {
            AgentAddress::Set(addr)
        }
    }
}

impl Display for AgentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentAddress::Unset => write!(f, "unset"),
            AgentAddress::Set(addr) => write!(f, "{:#x}", addr),
        }
    }
}

/// How long, and how deep, to wait for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// The number of confirmations after which a transaction is durable
    pub confirmations: u64,
    /// The longest we wait before reporting the transaction as unconfirmed
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        }
    }
}

/// A summary of the receipt of a confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxConfirmation {
    /// The transaction hash
    pub tx_hash: TxHash,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
    /// The gas used by the transaction
    pub gas_used: u64,
    /// Whether the transaction executed successfully
    pub success: bool,
}

impl Display for TxConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx {:#x}, ", self.tx_hash)?;
        match self.block_number {
            Some(block) => write!(f, "block {}, ", block)?,
            None => write!(f, "block pending, ")?,
        }
        write!(
            f,
            "gas used {}, status {}",
            self.gas_used,
            if self.success { "success" } else { "reverted" }
        )
    }
}

/// The currency a crowdsale raises, as it is displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyUnit {
    /// The display symbol
    pub symbol: String,
    /// Decimals between the smallest on-chain unit and the display unit
    pub decimals: u8,
}

impl Default for CurrencyUnit {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            decimals: DEFAULT_CURRENCY_DECIMALS,
        }
    }
}
