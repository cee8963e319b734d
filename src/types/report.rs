//! Per-chain and global report structures
//!
//! All of these are built fresh for one run: populated during collection,
//! finalised once by reconciliation, then handed to the presentation layer.

use crate::errors::{AppError, AppResult};
use crate::types::{Balance, PegType, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role → balance for one chain, plus the reconciled circulating figure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainReport {
    #[serde(flatten)]
    pub issuances: BTreeMap<Role, Balance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circulating: Option<Balance>,
}

impl ChainReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: Role, balance: Balance) {
        self.issuances.insert(role, balance);
    }

    pub fn get(&self, role: &Role) -> Option<&Balance> {
        self.issuances.get(role)
    }

    /// Raw unreleased amount, zero when the chain reports none
    pub fn unreleased(&self, peg_type: PegType) -> f64 {
        self.issuances
            .get(&Role::Unreleased)
            .map(|b| b.amount(peg_type))
            .unwrap_or(0.0)
    }

    pub fn circulating_amount(&self, peg_type: PegType) -> Option<f64> {
        self.circulating.as_ref().and_then(|b| b.get(peg_type))
    }

    /// Fail if the chain claims supply bridged from itself
    pub fn ensure_no_self_bridge(&self, chain: &str) -> AppResult<()> {
        if self
            .issuances
            .keys()
            .any(|role| role.origin() == Some(chain))
        {
            return Err(AppError::Configuration(format!(
                "Chain {} has issuance bridged to itself",
                chain
            )));
        }
        Ok(())
    }
}

/// One chain's report of supply bridged in from an origin chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeContribution {
    pub reporting_chain: String,
    pub balance: Balance,
}

/// Origin chain → every balance other chains reported as bridged from it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeContributionIndex {
    contributions: BTreeMap<String, Vec<BridgeContribution>>,
}

impl BridgeContributionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, origin: &str, reporting_chain: &str, balance: Balance) {
        self.contributions
            .entry(origin.to_string())
            .or_default()
            .push(BridgeContribution {
                reporting_chain: reporting_chain.to_string(),
                balance,
            });
    }

    /// Contributions that left `origin`, empty when none
    pub fn contributions_to(&self, origin: &str) -> &[BridgeContribution] {
        self.contributions
            .get(origin)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.contributions.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}

/// Totals across every real chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalCirculating {
    pub circulating: Balance,
    pub unreleased: Balance,
}

/// Final output of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalReport {
    pub peg_type: PegType,
    pub timestamp: i64,
    pub chains: BTreeMap<String, ChainReport>,
    pub total_circulating: TotalCirculating,
}

impl GlobalReport {
    pub fn total(&self) -> f64 {
        self.total_circulating.circulating.amount(self.peg_type)
    }

    pub fn total_unreleased(&self) -> f64 {
        self.total_circulating.unreleased.amount(self.peg_type)
    }

    pub fn circulating_on(&self, chain: &str) -> Option<f64> {
        self.chains
            .get(chain)
            .and_then(|report| report.circulating_amount(self.peg_type))
    }
}
