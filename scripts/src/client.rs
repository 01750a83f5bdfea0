//! Construction of the RPC client and the contract handles

use std::str::FromStr;

use alloy::{
    contract::{CallBuilder, CallDecoder},
    primitives::{Address, TxHash, U256},
    providers::{
        DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider,
        ProviderBuilder, WatchTxError,
    },
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use crowdsale_abi::{
    required_functions, Client, Crowdsale, ICrowdsale, IMintableToken, MintableToken,
};
use tracing::debug;

use crate::{
    chain::CrowdsaleChain,
    constants::{CROWDSALE_CONTRACT_KEY, FINALIZE_AGENT_CONTRACT_KEY, TOKEN_CONTRACT_KEY},
    deployments::DeploymentDescriptor,
    errors::ScriptError,
    types::{AgentAddress, ConfirmationPolicy, TxConfirmation},
};

/// Sets up the RPC client, signing locally if a private key is given.
///
/// Without a private key, transactions are sent unsigned and the node's
/// wallet signs them. Credentials embedded in the RPC URL are sent as HTTP
/// basic auth.
pub fn setup_client(
    rpc_url: &str,
    priv_key: Option<&str>,
) -> Result<(Client, Option<Address>), ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    match priv_key {
        Some(priv_key) => {
            let signer = PrivateKeySigner::from_str(priv_key)
                .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
            let sender = signer.address();
            let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
            Ok((DynProvider::new(provider), Some(sender)))
        }
        None => {
            let provider = ProviderBuilder::new().connect_http(url);
            Ok((DynProvider::new(provider), None))
        }
    }
}

/// Handles on the three crowdsale contracts
#[derive(Clone)]
pub struct CrowdsaleContracts {
    /// The token sold by the crowdsale
    pub token: MintableToken,
    /// The crowdsale
    pub crowdsale: Crowdsale,
    /// The address of the agent that settles the crowdsale
    pub finalize_agent: Address,
    /// The account that sends setup transactions, if not left to the node
    pub sender: Option<Address>,
}

impl CrowdsaleContracts {
    /// Build the handles from the addresses listed in the deployment descriptor
    pub fn new(
        descriptor: &DeploymentDescriptor,
        client: Client,
        sender: Option<Address>,
    ) -> Result<Self, ScriptError> {
        let token = descriptor.contract(TOKEN_CONTRACT_KEY)?;
        token.require_functions(required_functions::TOKEN)?;
        let crowdsale = descriptor.contract(CROWDSALE_CONTRACT_KEY)?;
        crowdsale.require_functions(required_functions::CROWDSALE)?;
        let finalize_agent = descriptor.contract(FINALIZE_AGENT_CONTRACT_KEY)?;

        debug!(
            token = %token.address,
            crowdsale = %crowdsale.address,
            finalize_agent = %finalize_agent.address,
            "loaded contract handles"
        );

        Ok(Self {
            token: IMintableToken::new(token.address, client.clone()),
            crowdsale: ICrowdsale::new(crowdsale.address, client),
            finalize_agent: finalize_agent.address,
            sender,
        })
    }

    /// Set the sender of a call if one is configured
    fn with_sender<'a, C: CallDecoder>(
        &self,
        call: CallBuilder<&'a Client, C>,
    ) -> CallBuilder<&'a Client, C> {
        match self.sender {
            Some(sender) => call.from(sender),
            None => call,
        }
    }
}

/// Map a failed read to a [`ScriptError`]
fn query_err(method: &str, e: impl ToString) -> ScriptError {
    ScriptError::ContractQuery(format!("{}: {}", method, e.to_string()))
}

/// Map a failed submission to a [`ScriptError`]
fn send_err(method: &str, e: impl ToString) -> ScriptError {
    ScriptError::ContractInteraction(format!("{}: {}", method, e.to_string()))
}

impl CrowdsaleChain for CrowdsaleContracts {
    fn token_address(&self) -> Address {
        *self.token.address()
    }

    fn crowdsale_address(&self) -> Address {
        *self.crowdsale.address()
    }

    fn finalize_agent_address(&self) -> Address {
        self.finalize_agent
    }

    async fn total_supply(&self) -> Result<U256, ScriptError> {
        self.token
            .totalSupply()
            .call()
            .await
            .map_err(|e| query_err("totalSupply", e))
    }

    async fn crowdsale_state(&self) -> Result<u8, ScriptError> {
        self.crowdsale
            .getState()
            .call()
            .await
            .map_err(|e| query_err("getState", e))
    }

    async fn starts_at(&self) -> Result<U256, ScriptError> {
        self.crowdsale
            .startsAt()
            .call()
            .await
            .map_err(|e| query_err("startsAt", e))
    }

    async fn ends_at(&self) -> Result<U256, ScriptError> {
        self.crowdsale
            .endsAt()
            .call()
            .await
            .map_err(|e| query_err("endsAt", e))
    }

    async fn wei_raised(&self) -> Result<U256, ScriptError> {
        self.crowdsale
            .weiRaised()
            .call()
            .await
            .map_err(|e| query_err("weiRaised", e))
    }

    async fn tokens_sold(&self) -> Result<U256, ScriptError> {
        self.crowdsale
            .tokensSold()
            .call()
            .await
            .map_err(|e| query_err("tokensSold", e))
    }

    async fn release_agent(&self) -> Result<AgentAddress, ScriptError> {
        let agent = self
            .token
            .releaseAgent()
            .call()
            .await
            .map_err(|e| query_err("releaseAgent", e))?;
        Ok(agent.into())
    }

    async fn finalize_agent(&self) -> Result<AgentAddress, ScriptError> {
        let agent = self
            .crowdsale
            .finalizeAgent()
            .call()
            .await
            .map_err(|e| query_err("finalizeAgent", e))?;
        Ok(agent.into())
    }

    async fn is_mint_agent(&self, addr: Address) -> Result<bool, ScriptError> {
        self.token
            .mintAgents(addr)
            .call()
            .await
            .map_err(|e| query_err("mintAgents", e))
    }

    async fn set_release_agent(&self, agent: Address) -> Result<TxHash, ScriptError> {
        let pending = self
            .with_sender(self.token.setReleaseAgent(agent))
            .send()
            .await
            .map_err(|e| send_err("setReleaseAgent", e))?;
        Ok(*pending.tx_hash())
    }

    async fn set_finalize_agent(&self, agent: Address) -> Result<TxHash, ScriptError> {
        let pending = self
            .with_sender(self.crowdsale.setFinalizeAgent(agent))
            .send()
            .await
            .map_err(|e| send_err("setFinalizeAgent", e))?;
        Ok(*pending.tx_hash())
    }

    async fn set_mint_agent(&self, agent: Address, enabled: bool) -> Result<TxHash, ScriptError> {
        let pending = self
            .with_sender(self.token.setMintAgent(agent, enabled))
            .send()
            .await
            .map_err(|e| send_err("setMintAgent", e))?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(
        &self,
        tx_hash: TxHash,
        policy: &ConfirmationPolicy,
    ) -> Result<TxConfirmation, ScriptError> {
        let receipt = PendingTransactionBuilder::new(self.token.provider().root().clone(), tx_hash)
            .with_required_confirmations(policy.confirmations)
            .with_timeout(Some(policy.timeout))
            .get_receipt()
            .await
            .map_err(|e| match e {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    ScriptError::ConfirmationTimeout {
                        tx_hash,
                        timeout: policy.timeout,
                    }
                }
                e => ScriptError::Confirmation(e.to_string()),
            })?;

        let confirmation = TxConfirmation {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            success: receipt.status(),
        };

        if !confirmation.success {
            return Err(ScriptError::TransactionReverted(tx_hash));
        }

        Ok(confirmation)
    }
}
