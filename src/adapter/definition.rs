//! TOML adapter definitions
//!
//! An adapter file describes one pegged asset:
//!
//! ```toml
//! name = "first-digital-usd"
//! peg_type = "peggedUSD"
//! decimals = 18
//!
//! [chains.ethereum]
//! issued = ["0xc5f0f7b66764F6ec8C8Dff7BA683102295E16409"]
//! unreleased = ["0x47ac0Fb4F2D84898e4D9E7b4DaB3C24507a6D503"]
//!
//! [chains.polygon]
//! bridged_from_eth = ["0x..."]
//! ```

use crate::adapter::AdapterRegistry;
use crate::errors::{AppError, AppResult};
use crate::source::{BridgeLabel, SupplySource};
use crate::types::{PegType, Role};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Decimals assumed for bridged copies when nothing else is configured
pub const DEFAULT_BRIDGED_DECIMALS: u32 = 18;

#[derive(Debug, Clone, Deserialize)]
pub struct AdapterDefinition {
    pub name: String,
    #[serde(default)]
    pub peg_type: PegType,
    /// Decimals of the issued token; read on-chain when absent
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub chains: BTreeMap<String, ChainDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainDefinition {
    /// Issued token addresses on this chain (role `minted`)
    #[serde(default)]
    pub issued: Vec<String>,
    /// Overrides the adapter-wide decimals for this chain
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Addresses holding issued but non-circulating supply (role `unreleased`)
    #[serde(default, alias = "reserves")]
    pub unreleased: Vec<String>,
    /// Shorthand for bridged copies of Ethereum supply
    #[serde(default, alias = "bridgedFromETH")]
    pub bridged_from_eth: Vec<String>,
    #[serde(default)]
    pub bridged: Vec<BridgedDefinition>,
    #[serde(default)]
    pub bridge_minus_reserve: Vec<BridgeMinusReserveDefinition>,
    /// Static role → amount figures
    #[serde(default)]
    pub fixed: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgedDefinition {
    /// Origin chain; becomes the role name
    pub from: String,
    pub tokens: Vec<String>,
    /// Merge under this bridge label instead of tracking each token
    #[serde(default)]
    pub bridge: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    /// Chain to query when it differs from the reporting chain
    #[serde(default)]
    pub chain: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeMinusReserveDefinition {
    pub from: String,
    pub bridge_address: String,
    #[serde(default)]
    pub reserves: Vec<String>,
    #[serde(default)]
    pub bridge: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub chain: Option<String>,
}

impl AdapterDefinition {
    /// Read and parse an adapter file
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let definition = Self::from_toml(&text)?;
        debug!(
            "Loaded adapter {} from {} ({} chains)",
            definition.name,
            path.display(),
            definition.chains.len()
        );
        Ok(definition)
    }

    pub fn from_toml(text: &str) -> AppResult<Self> {
        let definition: AdapterDefinition = toml::from_str(text)?;
        for (chain, chain_def) in &definition.chains {
            for key in chain_def.extra.keys() {
                warn!(
                    "Adapter {}: ignoring unknown key '{}' on chain {}",
                    definition.name, key, chain
                );
            }
        }
        Ok(definition)
    }

    /// Build the registry for `peg_type`
    ///
    /// Every source is tagged with the requested peg type so an adapter file
    /// can be replayed under another denomination.
    pub fn into_registry(&self, peg_type: PegType) -> AppResult<AdapterRegistry> {
        let mut registry = AdapterRegistry::new(&self.name, peg_type);

        for (chain, def) in &self.chains {
            let issued_decimals = def.decimals.or(self.decimals);
            let bridged_decimals = issued_decimals.unwrap_or(DEFAULT_BRIDGED_DECIMALS);

            if !def.issued.is_empty() {
                registry.insert(
                    chain,
                    Role::Minted,
                    SupplySource::NativeIssued {
                        peg_type,
                        tokens: def.issued.clone(),
                        decimals: issued_decimals,
                    },
                )?;
            }

            if !def.unreleased.is_empty() {
                if def.issued.is_empty() {
                    return Err(AppError::Configuration(format!(
                        "Chain {} lists unreleased holders without an issued token",
                        chain
                    )));
                }
                registry.insert(
                    chain,
                    Role::Unreleased,
                    SupplySource::EscrowedReserve {
                        peg_type,
                        tokens: def.issued.clone(),
                        holders: def.unreleased.clone(),
                        decimals: issued_decimals,
                        query_chain: None,
                    },
                )?;
            }

            for bridged in &def.bridged {
                registry.insert(
                    chain,
                    Role::bridged_from(bridged.from.as_str()),
                    SupplySource::BridgedIn {
                        peg_type,
                        query_chain: bridged.chain.clone(),
                        tokens: bridged.tokens.clone(),
                        decimals: bridged.decimals.unwrap_or(bridged_decimals),
                        label: BridgeLabel {
                            bridge: bridged.bridge.clone(),
                            bridged_from: Some(bridged.from.clone()),
                        },
                    },
                )?;
            }

            for entry in &def.bridge_minus_reserve {
                registry.insert(
                    chain,
                    Role::bridged_from(entry.from.as_str()),
                    SupplySource::BridgeMinusReserve {
                        peg_type,
                        query_chain: entry.chain.clone(),
                        bridge_address: entry.bridge_address.clone(),
                        reserves: entry.reserves.clone(),
                        decimals: entry.decimals.unwrap_or(bridged_decimals),
                        label: BridgeLabel {
                            bridge: entry.bridge.clone(),
                            bridged_from: Some(entry.from.clone()),
                        },
                    },
                )?;
            }

            if !def.bridged_from_eth.is_empty() {
                let role = Role::bridged_from("ethereum");
                let explicit = registry
                    .roles_for(chain)
                    .map(|roles| roles.contains_key(&role))
                    .unwrap_or(false);
                if explicit {
                    warn!(
                        "Adapter {}: chain {} has an explicit ethereum bridge entry, ignoring bridged_from_eth",
                        self.name, chain
                    );
                } else {
                    registry.insert(
                        chain,
                        role,
                        SupplySource::BridgedIn {
                            peg_type,
                            query_chain: None,
                            tokens: def.bridged_from_eth.clone(),
                            decimals: bridged_decimals,
                            label: BridgeLabel {
                                bridge: None,
                                bridged_from: Some("ethereum".to_string()),
                            },
                        },
                    )?;
                }
            }

            for (role_name, amount) in &def.fixed {
                let role = Role::from(role_name.as_str());
                let label = role.origin().map(|origin| format!("fixed:{}", origin));
                registry.insert(
                    chain,
                    role,
                    SupplySource::Fixed {
                        peg_type,
                        amount: *amount,
                        label,
                    },
                )?;
            }
        }

        Ok(registry)
    }
}
