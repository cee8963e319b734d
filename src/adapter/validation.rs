//! Static checks on adapter definitions, run before any network access

use crate::adapter::definition::{AdapterDefinition, ChainDefinition};
use crate::errors::{AppError, AppResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// Chains with an EVM JSON-RPC surface
pub const EVM_CHAINS: &[&str] = &[
    "arbitrum",
    "astar",
    "aurora",
    "avalanche",
    "avax",
    "base",
    "boba",
    "bsc",
    "canto",
    "celo",
    "cronos",
    "dogechain",
    "era",
    "ethereum",
    "ethereumclassic",
    "evmos",
    "fantom",
    "fuse",
    "harmony",
    "heco",
    "iotex",
    "kava",
    "klaytn",
    "linea",
    "metis",
    "moonbeam",
    "okexchain",
    "optimism",
    "polygon",
    "q",
    "telos",
    "thundercore",
    "xdai",
];

/// Chains without an EVM surface; only fixed or custom sources apply
pub const NON_EVM_CHAINS: &[&str] = &[
    "algorand",
    "loopring",
    "near",
    "osmosis",
    "solana",
    "stellar",
    "terra",
    "tezos",
    "tron",
    "waves",
];

lazy_static! {
    static ref EVM_ADDRESS: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
    static ref CHAIN_NAME: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

pub fn is_known_chain(chain: &str) -> bool {
    EVM_CHAINS.contains(&chain) || NON_EVM_CHAINS.contains(&chain)
}

pub fn is_evm_chain(chain: &str) -> bool {
    EVM_CHAINS.contains(&chain)
}

pub fn is_evm_address(address: &str) -> bool {
    EVM_ADDRESS.is_match(address)
}

/// One problem found in an adapter file
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub chain: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.chain, self.message)
    }
}

/// Collect every issue in `definition`
pub fn validate_definition(definition: &AdapterDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if definition.chains.is_empty() {
        issues.push(ValidationIssue {
            chain: "*".to_string(),
            message: "adapter declares no chains".to_string(),
        });
    }

    for (chain, def) in &definition.chains {
        let mut report = |message: String| {
            issues.push(ValidationIssue {
                chain: chain.clone(),
                message,
            })
        };

        if !CHAIN_NAME.is_match(chain) {
            report(format!("'{}' is not a valid chain name", chain));
        } else if !is_known_chain(chain) {
            report(format!("unknown chain '{}'", chain));
        }

        check_origins(chain, def, &mut report);
        check_addresses(chain, def, &mut report);
    }

    issues
}

/// Fail with a configuration error listing every issue
pub fn ensure_valid(definition: &AdapterDefinition) -> AppResult<()> {
    let issues = validate_definition(definition);
    if issues.is_empty() {
        return Ok(());
    }
    let joined = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::Configuration(format!(
        "Adapter {} is invalid: {}",
        definition.name, joined
    )))
}

fn check_origins(chain: &str, def: &ChainDefinition, report: &mut impl FnMut(String)) {
    let origins = def
        .bridged
        .iter()
        .map(|b| b.from.as_str())
        .chain(def.bridge_minus_reserve.iter().map(|b| b.from.as_str()))
        .chain((!def.bridged_from_eth.is_empty()).then_some("ethereum"))
        .chain(
            def.fixed
                .keys()
                .map(String::as_str)
                .filter(|role| *role != "minted" && *role != "unreleased"),
        );

    for origin in origins {
        if origin == chain {
            report(format!("issuance bridged to itself ('{}')", origin));
        } else if !is_known_chain(origin) {
            report(format!("bridged from unknown chain '{}'", origin));
        }
    }

    for (role, amount) in &def.fixed {
        if !amount.is_finite() || *amount < 0.0 {
            report(format!("fixed amount for {} must be a non-negative number", role));
        }
    }
}

fn check_addresses(chain: &str, def: &ChainDefinition, report: &mut impl FnMut(String)) {
    let mut on_chain: Vec<(&str, &str)> = Vec::new();
    on_chain.extend(def.issued.iter().map(|a| (chain, a.as_str())));
    on_chain.extend(def.unreleased.iter().map(|a| (chain, a.as_str())));
    on_chain.extend(def.bridged_from_eth.iter().map(|a| (chain, a.as_str())));
    for bridged in &def.bridged {
        let query = bridged.chain.as_deref().unwrap_or(chain);
        on_chain.extend(bridged.tokens.iter().map(|a| (query, a.as_str())));
    }
    for entry in &def.bridge_minus_reserve {
        let query = entry.chain.as_deref().unwrap_or(chain);
        on_chain.push((query, entry.bridge_address.as_str()));
        on_chain.extend(entry.reserves.iter().map(|a| (query, a.as_str())));
    }

    let mut non_evm_reported = BTreeSet::new();
    for (query_chain, address) in on_chain {
        if !is_evm_chain(query_chain) {
            // One message per queried chain
            if non_evm_reported.insert(query_chain) {
                report(format!(
                    "on-chain source for {} needs an EVM chain; use a fixed or custom source",
                    query_chain
                ));
            }
            continue;
        }
        if !is_evm_address(address) {
            report(format!("'{}' is not a valid EVM address", address));
        }
    }
}
