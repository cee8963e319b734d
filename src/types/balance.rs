//! Balance accumulator used by every supply source

use crate::errors::{SourceError, SourceResult};
use crate::types::PegType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where part of a balance came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeProvenance {
    pub amount: f64,
    /// Address when tracked individually, otherwise the shared bridge or source label
    pub bridge_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridged_from_chain: Option<String>,
    #[serde(default)]
    pub individual: bool,
}

/// Amounts per peg type plus provenance annotations
///
/// The amount under a peg type is always the sum of every contribution added
/// to it. Provenance records annotate that sum and never replace it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(flatten)]
    amounts: BTreeMap<PegType, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bridges: Vec<BridgeProvenance>,
}

impl Balance {
    pub fn new() -> Self {
        Self::default()
    }

    /// A balance holding exactly zero of `peg_type`
    pub fn zero(peg_type: PegType) -> Self {
        let mut balance = Self::new();
        balance.amounts.insert(peg_type, 0.0);
        balance
    }

    /// Single unlabelled amount, for synthetic figures such as circulating totals
    pub fn with_amount(peg_type: PegType, amount: f64) -> Self {
        let mut balance = Self::new();
        balance.amounts.insert(peg_type, amount);
        balance
    }

    /// Add one logical contribution.
    ///
    /// The peg type entry is created at zero if absent and then incremented.
    /// With a `source_label`, a provenance record keyed by
    /// `(source_label, bridged_from)` is created or topped up. Callers must add
    /// each logical contribution exactly once.
    pub fn add_contribution(
        &mut self,
        peg_type: PegType,
        amount: f64,
        source_label: Option<&str>,
        track_individually: bool,
        bridged_from: Option<&str>,
    ) -> SourceResult<()> {
        if !amount.is_finite() {
            return Err(SourceError::NotANumber(format!(
                "{} contribution of {}{}",
                peg_type,
                amount,
                source_label
                    .map(|l| format!(" from {}", l))
                    .unwrap_or_default()
            )));
        }

        *self.amounts.entry(peg_type).or_insert(0.0) += amount;

        if let Some(label) = source_label {
            let existing = self.bridges.iter_mut().find(|record| {
                record.bridge_name == label
                    && record.bridged_from_chain.as_deref() == bridged_from
                    && record.individual == track_individually
            });
            match existing {
                Some(record) => record.amount += amount,
                None => self.bridges.push(BridgeProvenance {
                    amount,
                    bridge_name: label.to_string(),
                    bridged_from_chain: bridged_from.map(str::to_string),
                    individual: track_individually,
                }),
            }
        }

        Ok(())
    }

    /// Amount under `peg_type`, if present
    pub fn get(&self, peg_type: PegType) -> Option<f64> {
        self.amounts.get(&peg_type).copied()
    }

    /// Amount under `peg_type`, zero when absent
    pub fn amount(&self, peg_type: PegType) -> f64 {
        self.get(peg_type).unwrap_or(0.0)
    }

    pub fn set_amount(&mut self, peg_type: PegType, amount: f64) {
        self.amounts.insert(peg_type, amount);
    }

    /// True when no peg type has been recorded at all
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn peg_types(&self) -> impl Iterator<Item = PegType> + '_ {
        self.amounts.keys().copied()
    }

    pub fn bridges(&self) -> &[BridgeProvenance] {
        &self.bridges
    }

    pub fn has_provenance(&self) -> bool {
        !self.bridges.is_empty()
    }

    /// Fold another balance in, amounts and provenance alike
    pub fn merge(&mut self, other: &Balance) {
        for (peg, amount) in &other.amounts {
            *self.amounts.entry(*peg).or_insert(0.0) += amount;
        }
        for record in &other.bridges {
            let existing = self.bridges.iter_mut().find(|r| {
                r.bridge_name == record.bridge_name
                    && r.bridged_from_chain == record.bridged_from_chain
                    && r.individual == record.individual
            });
            match existing {
                Some(r) => r.amount += record.amount,
                None => self.bridges.push(record.clone()),
            }
        }
    }
}
