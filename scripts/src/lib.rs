//! Scripts for inspecting and configuring a token crowdsale.

#![deny(missing_docs)]

pub mod bootstrap;
pub mod chain;
pub mod cli;
pub mod client;
mod commands;
pub mod constants;
pub mod deployments;
pub mod errors;
#[cfg(test)]
mod mock;
pub mod report;
pub mod types;
pub mod utils;
