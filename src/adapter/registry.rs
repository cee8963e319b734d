//! Constructed adapter registry: chain → role → supply source

use crate::errors::{AppError, AppResult};
use crate::source::SupplySource;
use crate::types::{PegType, Role};
use std::collections::BTreeMap;

/// Sources declared for one pegged asset
///
/// Built once per run and passed into collection by value or reference.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    pub name: String,
    pub peg_type: PegType,
    chains: BTreeMap<String, BTreeMap<Role, SupplySource>>,
}

impl AdapterRegistry {
    pub fn new(name: &str, peg_type: PegType) -> Self {
        Self {
            name: name.to_string(),
            peg_type,
            chains: BTreeMap::new(),
        }
    }

    /// Declare the source for `role` on `chain`
    ///
    /// A chain cannot claim supply bridged from itself, and a role has exactly
    /// one source.
    pub fn insert(&mut self, chain: &str, role: Role, source: SupplySource) -> AppResult<()> {
        if role.origin() == Some(chain) {
            return Err(AppError::Configuration(format!(
                "Chain {} has issuance bridged to itself",
                chain
            )));
        }

        let roles = self.chains.entry(chain.to_string()).or_default();
        if roles.contains_key(&role) {
            return Err(AppError::Configuration(format!(
                "Chain {} declares more than one source for role {}",
                chain, role
            )));
        }
        roles.insert(role, source);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_source(mut self, chain: &str, role: Role, source: SupplySource) -> AppResult<Self> {
        self.insert(chain, role, source)?;
        Ok(self)
    }

    pub fn chains(&self) -> impl Iterator<Item = (&str, &BTreeMap<Role, SupplySource>)> {
        self.chains.iter().map(|(chain, roles)| (chain.as_str(), roles))
    }

    pub fn roles_for(&self, chain: &str) -> Option<&BTreeMap<Role, SupplySource>> {
        self.chains.get(chain)
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Total (chain, role) pairs
    pub fn source_count(&self) -> usize {
        self.chains.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.source_count() == 0
    }

    /// Re-check every chain for self-bridging before any source runs
    pub fn ensure_no_self_bridge(&self) -> AppResult<()> {
        for (chain, roles) in &self.chains {
            if roles.keys().any(|role| role.origin() == Some(chain.as_str())) {
                return Err(AppError::Configuration(format!(
                    "Chain {} has issuance bridged to itself",
                    chain
                )));
            }
        }
        Ok(())
    }
}
