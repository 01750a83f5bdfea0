//! The one-time wiring between the token, the crowdsale, and the finalize agent
//!
//! Every step reads the current configuration first and only submits a
//! transaction if the configuration is not in place yet, so running the setup
//! again on a configured crowdsale sends nothing. Steps run strictly in order,
//! each waiting for its transaction to be confirmed before the next one reads
//! state.

use std::fmt::{self, Display};

use alloy::primitives::TxHash;
use tracing::info;

use crate::{
    chain::CrowdsaleChain,
    errors::ScriptError,
    types::{ConfirmationPolicy, TxConfirmation},
};

/// A single setup step, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// Make the finalize agent the token's release agent
    ReleaseAgent,
    /// Register the finalize agent with the crowdsale
    FinalizeAgent,
    /// Allow the crowdsale to mint tokens
    MintAgent,
}

impl SetupStep {
    /// All steps, in the order they run
    pub const ALL: [SetupStep; 3] = [
        SetupStep::ReleaseAgent,
        SetupStep::FinalizeAgent,
        SetupStep::MintAgent,
    ];

    /// The contract method the step calls
    pub fn method(&self) -> &'static str {
        match self {
            SetupStep::ReleaseAgent => "mytoken.setReleaseAgent",
            SetupStep::FinalizeAgent => "crowdsale.setFinalizeAgent",
            SetupStep::MintAgent => "mytoken.setMintAgent",
        }
    }

    /// Whether the chain still needs this step
    async fn is_needed(&self, chain: &impl CrowdsaleChain) -> Result<bool, ScriptError> {
        match self {
            SetupStep::ReleaseAgent => {
                let current = chain.release_agent().await?;
                Ok(!current.is(chain.finalize_agent_address()))
            }
            // An already registered agent is left alone, even a different one
            SetupStep::FinalizeAgent => Ok(chain.finalize_agent().await?.is_unset()),
            SetupStep::MintAgent => Ok(!chain.is_mint_agent(chain.crowdsale_address()).await?),
        }
    }

    /// Submit the step's transaction
    async fn submit(&self, chain: &impl CrowdsaleChain) -> Result<TxHash, ScriptError> {
        match self {
            SetupStep::ReleaseAgent => {
                chain
                    .set_release_agent(chain.finalize_agent_address())
                    .await
            }
            SetupStep::FinalizeAgent => {
                chain
                    .set_finalize_agent(chain.finalize_agent_address())
                    .await
            }
            SetupStep::MintAgent => {
                chain
                    .set_mint_agent(chain.crowdsale_address(), true /* enabled */)
                    .await
            }
        }
    }
}

impl Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method())
    }
}

/// What happened in a setup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The configuration was already in place, nothing was sent
    AlreadyConfigured,
    /// Dry run: the step's transaction would have been sent
    WouldSend,
    /// The step's transaction was sent and confirmed
    Confirmed(TxConfirmation),
}

/// The outcome of a setup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// The step
    pub step: SetupStep,
    /// What happened
    pub outcome: StepOutcome,
}

impl Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::AlreadyConfigured => write!(f, "{}: already configured", self.step),
            StepOutcome::WouldSend => write!(f, "{}: would send", self.step),
            StepOutcome::Confirmed(confirmation) => {
                write!(f, "{}: confirmed ({})", self.step, confirmation)
            }
        }
    }
}

/// Run the setup steps in order, stopping at the first failure.
///
/// With `dry_run` set, only the checks run.
pub async fn run_setup(
    chain: &impl CrowdsaleChain,
    policy: &ConfirmationPolicy,
    dry_run: bool,
) -> Result<Vec<StepReport>, ScriptError> {
    let mut reports = Vec::with_capacity(SetupStep::ALL.len());
    for step in SetupStep::ALL {
        let outcome = run_step(step, chain, policy, dry_run).await?;
        reports.push(StepReport { step, outcome });
    }

    Ok(reports)
}

/// Check a single step and, if needed, send and confirm its transaction
async fn run_step(
    step: SetupStep,
    chain: &impl CrowdsaleChain,
    policy: &ConfirmationPolicy,
    dry_run: bool,
) -> Result<StepOutcome, ScriptError> {
    if !step.is_needed(chain).await? {
        info!("{} already configured", step);
        return Ok(StepOutcome::AlreadyConfigured);
    }

    if dry_run {
        info!("{} needed, skipping in dry run", step);
        return Ok(StepOutcome::WouldSend);
    }

    let tx_hash = step.submit(chain).await?;
    info!("confirming {}: {:#x}", step, tx_hash);

    let confirmation = chain.confirm(tx_hash, policy).await?;
    info!("{} receipt: {}", step, confirmation);

    Ok(StepOutcome::Confirmed(confirmation))
}
