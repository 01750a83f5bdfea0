use std::{env, io, process::ExitCode};

use clap::Parser;
use crowdsale_scripts::{
    cli::{debug_echo, Cli, CommandError},
    client::{setup_client, CrowdsaleContracts},
    constants::DEBUG_ENV_VAR,
    deployments::DeploymentDescriptor,
    errors::ScriptError,
};
use tracing::{error, level_filters::LevelFilter, warn};

/// Exit code for a command line that names no known command
const EXIT_UNRECOGNIZED_COMMAND: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let debug = env::var_os(DEBUG_ENV_VAR).is_some();
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let echo = |cmd: &str| {
        if debug {
            for line in debug_echo(&argv, cmd) {
                println!("{}", line);
            }
        }
    };

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match CommandError::from_clap(&e) {
            Some(cmd_err) => {
                echo(cmd_err.token());
                println!("{}", cmd_err);
                return ExitCode::from(EXIT_UNRECOGNIZED_COMMAND);
            }
            // Help, version, and malformed options
            None => e.exit(),
        },
    };
    echo(cli.command.name());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if e.is_retryable() {
                warn!("the failure is transient, rerunning the command is safe");
            }
            println!("err {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Build the contract handles and run the chosen command
async fn run(cli: Cli) -> Result<(), ScriptError> {
    let descriptor = DeploymentDescriptor::load(&cli.deployments)?;
    let (client, signer) = setup_client(&cli.rpc_url, cli.priv_key.as_deref())?;
    let contracts = CrowdsaleContracts::new(&descriptor, client, signer.or(cli.sender))?;

    let unit = cli.currency_unit();
    let policy = cli.confirmation_policy();
    cli.command
        .run(&contracts, &unit, &policy, &mut io::stdout())
        .await
}
