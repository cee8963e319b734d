//! Pegged asset supply aggregation and reconciliation
//!
//! Collects per-chain issuance figures from declarative adapters, nets minted,
//! unreleased and bridged supply per chain, subtracts bridged double counting
//! at the origin chain and validates the global circulating total.

pub mod adapter;
pub mod cli;
pub mod config;
pub mod errors;
pub mod processor;
pub mod reports;
pub mod rpc;
pub mod source;
pub mod types;
pub mod utils;
