//! Pegged Asset Supply Tracker - Type System
//!
//! - `peg_type`: denomination tags (`peggedUSD`, `peggedEUR`, ...)
//! - `role`: what a figure on a chain means (minted, unreleased, bridged-from)
//! - `balance`: the balance accumulator every supply source builds
//! - `report`: per-chain reports, the bridge contribution index, global report

mod balance;
mod peg_type;
mod report;
mod role;

pub use balance::{Balance, BridgeProvenance};
pub use peg_type::PegType;
pub use report::{
    BridgeContribution, BridgeContributionIndex, ChainReport, GlobalReport, TotalCirculating,
};
pub use role::Role;
