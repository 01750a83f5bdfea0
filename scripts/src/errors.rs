//! Definitions of errors that can occur during the execution of the crowdsale scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    time::Duration,
};

use alloy::primitives::TxHash;

/// Errors that can occur during the execution of the crowdsale scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading or interpreting the deployment descriptor
    ReadDeployments(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error reading contract state
    ContractQuery(String),
    /// Error submitting a state-changing contract call
    ContractInteraction(String),
    /// Error waiting for a submitted transaction to be confirmed
    Confirmation(String),
    /// The transaction did not reach the requested confirmation depth in time
    ConfirmationTimeout {
        /// The hash of the unconfirmed transaction
        tx_hash: TxHash,
        /// How long we waited
        timeout: Duration,
    },
    /// The transaction was mined but reverted
    TransactionReverted(TxHash),
    /// Error converting an on-chain value for display
    Conversion(String),
    /// Error writing command output
    Output(String),
}

impl ScriptError {
    /// Whether the failed action may succeed if run again unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScriptError::ConfirmationTimeout { .. })
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractQuery(s) => write!(f, "error querying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Confirmation(s) => write!(f, "error confirming transaction: {}", s),
            ScriptError::ConfirmationTimeout { tx_hash, timeout } => write!(
                f,
                "transaction {:#x} not confirmed after {}s, it may still be mined; rerun to retry",
                tx_hash,
                timeout.as_secs()
            ),
            ScriptError::TransactionReverted(tx_hash) => {
                write!(f, "transaction {:#x} reverted", tx_hash)
            }
            ScriptError::Conversion(s) => write!(f, "error converting value: {}", s),
            ScriptError::Output(s) => write!(f, "error writing output: {}", s),
        }
    }
}

impl Error for ScriptError {}
