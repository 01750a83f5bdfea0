//! Definitions of CLI arguments and commands for the crowdsale scripts

use std::{
    fmt::{self, Display},
    io::Write,
    path::PathBuf,
    time::Duration,
};

use alloy::primitives::Address;
use clap::{
    error::{ContextKind, ContextValue, ErrorKind},
    Args, Parser, Subcommand,
};

use crate::{
    chain::CrowdsaleChain,
    commands::{setup_crowdsale, show_info},
    constants::{
        DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_CURRENCY_DECIMALS,
        DEFAULT_CURRENCY_SYMBOL, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_RPC_URL,
    },
    errors::ScriptError,
    types::{ConfirmationPolicy, CurrencyUnit},
};

/// The flag carrying the private key, redacted when arguments are echoed
const PRIV_KEY_FLAG: &str = "--pkey";

/// Inspect and configure a token crowdsale
#[derive(Parser, Debug)]
#[command(name = "crowdsale", version, about, long_about = None)]
pub struct Cli {
    /// Network RPC URL, credentials may be embedded
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path to the deployment descriptor listing the contract addresses
    #[arg(short, long, env = "DEPLOYMENTS", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments: PathBuf,

    /// Private key to sign setup transactions with. If omitted, the node's
    /// wallet signs them
    #[arg(long = "pkey", env = "PKEY")]
    pub priv_key: Option<String>,

    /// Account to send setup transactions from, when the node signs
    #[arg(long, env = "SENDER")]
    pub sender: Option<Address>,

    /// Confirmations to wait for after each setup transaction
    #[arg(long, default_value_t = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Seconds to wait for a setup transaction to be confirmed
    #[arg(long, default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS)]
    pub confirmation_timeout: u64,

    /// Symbol of the currency the crowdsale raises
    #[arg(long, default_value = DEFAULT_CURRENCY_SYMBOL)]
    pub currency_symbol: String,

    /// Decimals of the currency the crowdsale raises
    #[arg(long, default_value_t = DEFAULT_CURRENCY_DECIMALS)]
    pub currency_decimals: u8,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The confirmation policy for setup transactions
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirmations: self.confirmations,
            timeout: Duration::from_secs(self.confirmation_timeout),
        }
    }

    /// The display unit of the raised currency
    pub fn currency_unit(&self) -> CurrencyUnit {
        CurrencyUnit {
            symbol: self.currency_symbol.clone(),
            decimals: self.currency_decimals,
        }
    }
}

/// The commands the scripts support
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the status of the crowdsale
    Info,
    /// Wire the token, the crowdsale, and the finalize agent together
    Setup(SetupArgs),
}

impl Command {
    /// The name the command is invoked by
    pub fn name(&self) -> &'static str {
        match self {
            Command::Info => "info",
            Command::Setup(_) => "setup",
        }
    }

    /// Run the command against the given contracts, writing its output to `out`
    pub async fn run(
        self,
        chain: &impl CrowdsaleChain,
        unit: &CurrencyUnit,
        policy: &ConfirmationPolicy,
        out: &mut impl Write,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Info => show_info(chain, unit, out).await,
            Command::Setup(args) => setup_crowdsale(args, chain, policy, out).await,
        }
    }
}

/// Configure the crowdsale for funding
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SetupArgs {
    /// Only check which steps are needed, without sending transactions
    #[arg(long)]
    pub dry_run: bool,
}

/// A command line that does not name a known command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command given is not known
    Unrecognized(String),
    /// No command was given
    Missing,
}

impl CommandError {
    /// Extract the command error from a parse failure, if that is what it is
    pub fn from_clap(err: &clap::Error) -> Option<Self> {
        match err.kind() {
            ErrorKind::InvalidSubcommand => {
                let token = match err.get(ContextKind::InvalidSubcommand) {
                    Some(ContextValue::String(token)) => token.clone(),
                    _ => String::new(),
                };
                Some(CommandError::Unrecognized(token))
            }
            ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Some(CommandError::Missing)
            }
            _ => None,
        }
    }
}

impl CommandError {
    /// The command token the error is about
    pub fn token(&self) -> &str {
        match self {
            CommandError::Unrecognized(token) => token,
            CommandError::Missing => "<none>",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unrecognized(token) => write!(f, "unrecognized command {}", token),
            CommandError::Missing => write!(f, "no command given, expected `info` or `setup`"),
        }
    }
}

/// Mask the private key and any URL credentials in a list of command line arguments
pub fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            redacted.push("<redacted>".to_string());
            mask_next = false;
        } else if arg == PRIV_KEY_FLAG {
            redacted.push(arg.clone());
            mask_next = true;
        } else if arg.starts_with(&format!("{}=", PRIV_KEY_FLAG)) {
            redacted.push(format!("{}=<redacted>", PRIV_KEY_FLAG));
        } else {
            redacted.push(redact_userinfo(arg));
        }
    }

    redacted
}

/// Replace the `user:pass` part of a URL, leaving anything else untouched
fn redact_userinfo(arg: &str) -> String {
    let Some(scheme_end) = arg.find("://").map(|idx| idx + 3) else {
        return arg.to_string();
    };

    let rest = &arg[scheme_end..];
    let authority = rest.split('/').next().unwrap_or(rest);
    match authority.rfind('@') {
        Some(at) => format!("{}<redacted>{}", &arg[..scheme_end], &rest[at..]),
        None => arg.to_string(),
    }
}

/// The lines echoed before dispatch when debugging is enabled: the
/// (redacted) arguments and the command token
pub fn debug_echo(argv: &[String], cmd: &str) -> [String; 2] {
    [
        format!("argv {:?}", redact_args(argv)),
        format!("cmd {}", cmd),
    ]
}
