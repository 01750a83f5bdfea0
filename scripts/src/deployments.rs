//! Reading contract addresses from the deployment descriptor

use std::{collections::HashMap, fs, path::Path, str::FromStr};

use alloy::primitives::Address;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{constants::CONTRACTS_KEY, errors::ScriptError};

/// A single entry of a solar-style descriptor
#[derive(Deserialize)]
struct SolarContract {
    /// The contract address, hex encoded with or without a `0x` prefix
    address: String,
    /// The contract's JSON ABI
    #[serde(default)]
    abi: Option<Vec<Value>>,
    /// Whether the deployment transaction has been confirmed
    #[serde(default)]
    confirmed: Option<bool>,
}

/// A contract listed in the deployment descriptor
#[derive(Debug, Clone)]
pub struct DeployedContract {
    /// The name the contract is listed under
    pub name: String,
    /// The deployed address
    pub address: Address,
    /// The JSON ABI, if the descriptor carries one
    pub abi: Option<Vec<Value>>,
    /// Whether the deployer saw the deployment confirmed, if it recorded this
    pub confirmed: Option<bool>,
}

impl DeployedContract {
    /// Check that the contract's ABI declares every function in `functions`
    ///
    /// Contracts listed without an ABI pass unchecked.
    pub fn require_functions(&self, functions: &[&str]) -> Result<(), ScriptError> {
        let Some(abi) = &self.abi else {
            return Ok(());
        };

        let declared: Vec<&str> = abi
            .iter()
            .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("function"))
            .filter_map(|entry| entry.get("name").and_then(Value::as_str))
            .collect();

        match functions.iter().find(|f| !declared.contains(f)) {
            Some(missing) => Err(ScriptError::ReadDeployments(format!(
                "ABI of `{}` does not declare `{}`",
                self.name, missing
            ))),
            None => Ok(()),
        }
    }
}

/// The deployed contracts known to the scripts
#[derive(Debug, Clone, Default)]
pub struct DeploymentDescriptor {
    /// The deployed contracts, keyed by name
    contracts: HashMap<String, DeployedContract>,
}

impl DeploymentDescriptor {
    /// Read the descriptor at `path`
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScriptError::ReadDeployments(format!(
                "failed to read deployments file at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json_str(&content)
    }

    /// Parse a descriptor from its JSON representation
    pub fn from_json_str(content: &str) -> Result<Self, ScriptError> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;

        // Solar nests its contracts, each with an ABI and deployment metadata
        let contracts = match raw.get(CONTRACTS_KEY) {
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(name, entry)| {
                    let c = SolarContract::deserialize(entry).map_err(|e| {
                        ScriptError::ReadDeployments(format!(
                            "malformed entry for `{}`: {}",
                            name, e
                        ))
                    })?;
                    let contract = DeployedContract {
                        name: name.clone(),
                        address: parse_address(name, &c.address)?,
                        abi: c.abi,
                        confirmed: c.confirmed,
                    };
                    Ok((name.clone(), contract))
                })
                .collect::<Result<HashMap<_, _>, ScriptError>>()?,
            Some(_) => {
                return Err(ScriptError::ReadDeployments(format!(
                    "`{}` must be an object",
                    CONTRACTS_KEY
                )))
            }
            None => {
                let addresses = HashMap::<String, String>::deserialize(&raw)
                    .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
                addresses
                    .into_iter()
                    .map(|(name, addr)| {
                        let contract = DeployedContract {
                            address: parse_address(&name, &addr)?,
                            name: name.clone(),
                            abi: None,
                            confirmed: None,
                        };
                        Ok((name, contract))
                    })
                    .collect::<Result<HashMap<_, _>, ScriptError>>()?
            }
        };

        Ok(Self { contracts })
    }

    /// Look up the contract listed under `name`
    pub fn contract(&self, name: &str) -> Result<&DeployedContract, ScriptError> {
        let contract = self.contracts.get(name).ok_or_else(|| {
            ScriptError::ReadDeployments(format!("contract `{}` not found in deployments", name))
        })?;

        if contract.confirmed == Some(false) {
            warn!("deployment of `{}` is not confirmed yet", name);
        }

        Ok(contract)
    }
}

/// Parse a hex address, naming the contract it belongs to on failure.
///
/// The zero address marks an unset field on chain and is never a deployment.
fn parse_address(name: &str, addr: &str) -> Result<Address, ScriptError> {
    let address = Address::from_str(addr).map_err(|e| {
        ScriptError::ReadDeployments(format!(
            "failed to parse address `{}` of `{}`: {}",
            addr, name, e
        ))
    })?;

    if address.is_zero() {
        return Err(ScriptError::ReadDeployments(format!(
            "`{}` is listed at the zero address",
            name
        )));
    }

    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLAR_DESCRIPTOR: &str = r#"{
        "contracts": {
            "MyToken": {
                "abi": [
                    { "name": "totalSupply", "type": "function", "inputs": [], "outputs": [] },
                    { "name": "Transfer", "type": "event", "inputs": [] }
                ],
                "bytecode": "6060",
                "address": "a778c05f1d0f70f1133f4bbf78c1a9a7bf84aed3",
                "txid": "bd5a2b7bbc5c33e8e0e6c5c2a8b4f6b0d6d6a3f1e7c4a9b2e1d0c3b4a5f6e7d8",
                "owner": "qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW",
                "createdAt": "2017-12-07T08:41:19.466Z",
                "confirmed": true,
                "sender": "qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW",
                "senderHex": "7cb0d0b5aa5a3d2dda7fb5d1ac8bb4a9c5e1f1a4"
            },
            "Crowdsale": {
                "address": "0x1d6ea0a2a8b7ebd1c2a01e6d2c05bb5d2f5e1a11",
                "confirmed": false
            }
        },
        "libraries": {}
    }"#;

    #[test]
    fn test_solar_descriptor() {
        let descriptor = DeploymentDescriptor::from_json_str(SOLAR_DESCRIPTOR).unwrap();

        let token = descriptor.contract("MyToken").unwrap();
        assert_eq!(
            token.address,
            Address::from_str("0xa778c05f1d0f70f1133f4bbf78c1a9a7bf84aed3").unwrap()
        );
        assert_eq!(token.confirmed, Some(true));
        assert!(token.abi.is_some());

        let crowdsale = descriptor.contract("Crowdsale").unwrap();
        assert_eq!(crowdsale.confirmed, Some(false));
        assert!(crowdsale.abi.is_none());
    }

    #[test]
    fn test_flat_descriptor() {
        let descriptor = DeploymentDescriptor::from_json_str(
            r#"{ "FinalizeAgent": "0x5fbdb2315678afecb367f032d93f642f64180aa3" }"#,
        )
        .unwrap();

        let agent = descriptor.contract("FinalizeAgent").unwrap();
        assert_eq!(
            agent.address,
            Address::from_str("5fbdb2315678afecb367f032d93f642f64180aa3").unwrap()
        );
    }

    #[test]
    fn test_missing_contract() {
        let descriptor = DeploymentDescriptor::from_json_str(SOLAR_DESCRIPTOR).unwrap();
        let err = descriptor.contract("FinalizeAgent").unwrap_err();

        assert!(matches!(err, ScriptError::ReadDeployments(_)));
        assert!(err.to_string().contains("FinalizeAgent"));
    }

    #[test]
    fn test_malformed_descriptor() {
        assert!(DeploymentDescriptor::from_json_str("not json").is_err());
        assert!(
            DeploymentDescriptor::from_json_str(r#"{ "MyToken": "0xnothex" }"#).is_err(),
            "bad address should be rejected"
        );
    }

    #[test]
    fn test_zero_address_is_rejected() {
        let zero = "0x0000000000000000000000000000000000000000";

        let flat = format!(r#"{{ "FinalizeAgent": "{}" }}"#, zero);
        let err = DeploymentDescriptor::from_json_str(&flat).unwrap_err();
        assert!(matches!(err, ScriptError::ReadDeployments(_)));
        assert!(err.to_string().contains("FinalizeAgent"));

        let solar = format!(
            r#"{{ "contracts": {{ "FinalizeAgent": {{ "address": "{}" }} }} }}"#,
            &zero[2..]
        );
        let err = DeploymentDescriptor::from_json_str(&solar).unwrap_err();
        assert!(err.to_string().contains("zero address"));
    }

    #[test]
    fn test_malformed_entry_names_the_contract() {
        let err = DeploymentDescriptor::from_json_str(
            r#"{ "contracts": {
                "MyToken": { "address": "a778c05f1d0f70f1133f4bbf78c1a9a7bf84aed3" },
                "Crowdsale": { "confirmed": true }
            } }"#,
        )
        .unwrap_err();

        assert!(matches!(err, ScriptError::ReadDeployments(_)));
        assert!(err.to_string().contains("Crowdsale"));
        assert!(err.to_string().contains("address"));
    }

    #[test]
    fn test_required_functions() {
        let descriptor = DeploymentDescriptor::from_json_str(SOLAR_DESCRIPTOR).unwrap();
        let token = descriptor.contract("MyToken").unwrap();

        token.require_functions(&["totalSupply"]).unwrap();
        // Events do not satisfy a function requirement
        let err = token
            .require_functions(&["totalSupply", "Transfer"])
            .unwrap_err();
        assert!(err.to_string().contains("Transfer"));

        // No ABI, nothing to check
        let crowdsale = descriptor.contract("Crowdsale").unwrap();
        crowdsale.require_functions(&["getState"]).unwrap();
    }
}
