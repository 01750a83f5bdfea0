//! Solidity bindings for the crowdsale contracts
//!
//! Only the functions that the crowdsale scripts call are declared here. The
//! full ABIs live in the deployment descriptor.

use alloy::{network::Ethereum, providers::DynProvider, sol};

sol! {
    /// A token that is minted by authorized agents and stays locked until
    /// its release agent unlocks transfers
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IMintableToken {
        function totalSupply() external view returns (uint256 supply);
        function releaseAgent() external view returns (address agent);
        function setReleaseAgent(address addr) external;
        function mintAgents(address addr) external view returns (bool allowed);
        function setMintAgent(address addr, bool state) external;
    }
}

sol! {
    /// A timed token sale with a funding goal
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ICrowdsale {
        function getState() external view returns (uint8 state);
        function startsAt() external view returns (uint256 timestamp);
        function endsAt() external view returns (uint256 timestamp);
        function weiRaised() external view returns (uint256 amount);
        function tokensSold() external view returns (uint256 amount);
        function finalizeAgent() external view returns (address agent);
        function setFinalizeAgent(address addr) external;
    }
}

/// The provider type used by every contract instance
pub type Client = DynProvider<Ethereum>;
/// A token instance using the default generics
pub type MintableToken = IMintableToken::IMintableTokenInstance<Client, Ethereum>;
/// A crowdsale instance using the default generics
pub type Crowdsale = ICrowdsale::ICrowdsaleInstance<Client, Ethereum>;

/// The names of the functions each contract must expose, keyed by the
/// binding they are declared in. The finalize agent is only ever referenced
/// by address.
pub mod required_functions {
    /// Functions called on the token
    pub const TOKEN: &[&str] = &[
        "totalSupply",
        "releaseAgent",
        "setReleaseAgent",
        "mintAgents",
        "setMintAgent",
    ];

    /// Functions called on the crowdsale
    pub const CROWDSALE: &[&str] = &[
        "getState",
        "startsAt",
        "endsAt",
        "weiRaised",
        "tokensSold",
        "finalizeAgent",
        "setFinalizeAgent",
    ];
}
