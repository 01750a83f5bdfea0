//! Implementations of the crowdsale commands

use std::io::Write;

use tracing::info;

use crate::{
    bootstrap::run_setup,
    chain::CrowdsaleChain,
    cli::SetupArgs,
    constants::TIMESTAMP_CAVEAT,
    errors::ScriptError,
    report::fetch_status,
    types::{ConfirmationPolicy, CurrencyUnit},
};

/// Print the status of the crowdsale, followed by the read path caveat
pub async fn show_info(
    chain: &impl CrowdsaleChain,
    unit: &CurrencyUnit,
    out: &mut impl Write,
) -> Result<(), ScriptError> {
    let status = fetch_status(chain).await?;
    for line in status.render(unit)? {
        writeln!(out, "{}", line).map_err(|e| ScriptError::Output(e.to_string()))?;
    }
    writeln!(out, "{}", TIMESTAMP_CAVEAT).map_err(|e| ScriptError::Output(e.to_string()))?;

    Ok(())
}

/// Configure the crowdsale so that it is ready for funding
pub async fn setup_crowdsale(
    args: SetupArgs,
    chain: &impl CrowdsaleChain,
    policy: &ConfirmationPolicy,
    out: &mut impl Write,
) -> Result<(), ScriptError> {
    info!(
        token = %chain.token_address(),
        crowdsale = %chain.crowdsale_address(),
        finalize_agent = %chain.finalize_agent_address(),
        dry_run = args.dry_run,
        confirmations = policy.confirmations,
        "setting up crowdsale"
    );

    let reports = run_setup(chain, policy, args.dry_run).await?;
    for report in reports {
        writeln!(out, "{}", report).map_err(|e| ScriptError::Output(e.to_string()))?;
    }

    Ok(())
}
