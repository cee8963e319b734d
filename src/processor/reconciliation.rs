//! Reconciliation engine: nets raw per-chain figures into circulating supply
//!
//! Per chain, minted and bridged-in figures are added and unreleased figures
//! subtracted. Every amount other chains reported as bridged *from* this chain
//! is then subtracted, removing supply that would otherwise be counted both
//! here and at its destination. The global total is the sum over chains and
//! must pass the validation gate before a report is produced.

use crate::errors::{AppError, AppResult};
use crate::processor::collection::CollectedSupply;
use crate::types::{
    Balance, BridgeContribution, ChainReport, GlobalReport, PegType, Role, TotalCirculating,
};
use tracing::{debug, info, warn};

/// Relative size of negative float residue treated as zero
pub const NEGATIVE_RESIDUE_TOLERANCE: f64 = 1e-9;

pub struct ReconciliationEngine {
    peg_type: PegType,
    sanity_ceiling: f64,
}

impl ReconciliationEngine {
    pub fn new(peg_type: PegType, sanity_ceiling: f64) -> Self {
        Self {
            peg_type,
            sanity_ceiling,
        }
    }

    /// Turn collected figures into a validated global report
    pub fn reconcile(&self, collected: CollectedSupply, timestamp: i64) -> AppResult<GlobalReport> {
        let CollectedSupply {
            mut reports,
            bridge_index,
            ..
        } = collected;

        for (chain, report) in &reports {
            report.ensure_no_self_bridge(chain)?;
        }

        for (chain, report) in reports.iter_mut() {
            let circulating = chain_circulating(
                chain,
                report,
                bridge_index.contributions_to(chain),
                self.peg_type,
            )?;
            debug!("{} circulating on {}: {}", self.peg_type, chain, circulating);
            report.circulating = Some(Balance::with_amount(self.peg_type, circulating));
        }

        for origin in bridge_index.origins() {
            if !reports.contains_key(origin) {
                debug!(
                    "Supply bridged from {} has no origin chain in this adapter, nothing subtracted",
                    origin
                );
            }
        }

        let total_circulating = self.totals(&reports);
        self.validate_total(total_circulating.circulating.get(self.peg_type))?;

        info!(
            "Total {} circulating: {} across {} chains",
            self.peg_type,
            total_circulating.circulating.amount(self.peg_type),
            reports.len()
        );

        Ok(GlobalReport {
            peg_type: self.peg_type,
            timestamp,
            chains: reports,
            total_circulating,
        })
    }

    fn totals(&self, reports: &std::collections::BTreeMap<String, ChainReport>) -> TotalCirculating {
        let mut circulating = 0.0;
        let mut unreleased = 0.0;
        for report in reports.values() {
            circulating += report.circulating_amount(self.peg_type).unwrap_or(0.0);
            unreleased += report.unreleased(self.peg_type);
        }
        TotalCirculating {
            circulating: Balance::with_amount(self.peg_type, circulating),
            unreleased: Balance::with_amount(self.peg_type, unreleased),
        }
    }

    /// Final gate before a total is published
    pub fn validate_total(&self, total: Option<f64>) -> AppResult<()> {
        let total = match total {
            Some(value) if value.is_finite() => value,
            Some(value) => {
                return Err(AppError::ZeroOrMissingTotal(format!(
                    "total circulating is not a number ({})",
                    value
                )))
            }
            None => {
                return Err(AppError::ZeroOrMissingTotal(
                    "pegged asset doesn't have total circulating".to_string(),
                ))
            }
        };

        if total > self.sanity_ceiling {
            return Err(AppError::SanityCeiling {
                total,
                ceiling: self.sanity_ceiling,
            });
        }
        if total == 0.0 {
            return Err(AppError::ZeroOrMissingTotal(
                "returned 0 total circulating".to_string(),
            ));
        }
        Ok(())
    }
}

/// Circulating amount for one chain
///
/// Roles without a figure for `peg_type` are skipped. A bridge contribution is
/// skipped with a warning when it carries no figure. When the roles alone net
/// to exactly zero every contribution is skipped, since the origin has nothing
/// to bridge out.
pub fn chain_circulating(
    chain: &str,
    report: &ChainReport,
    contributions: &[BridgeContribution],
    peg_type: PegType,
) -> AppResult<f64> {
    let mut circulating = 0.0;
    let mut gross = 0.0_f64;

    for (role, balance) in &report.issuances {
        let Some(amount) = balance.get(peg_type) else {
            continue;
        };
        gross += amount.abs();
        match role {
            Role::Unreleased => circulating -= amount,
            Role::Minted | Role::BridgedFrom(_) => circulating += amount,
        }
    }

    // Decided once from the roles alone so contribution order cannot matter
    let nothing_to_bridge = circulating == 0.0;

    for contribution in contributions {
        match contribution.balance.get(peg_type) {
            Some(amount) if !nothing_to_bridge => {
                gross += amount.abs();
                circulating -= amount;
            }
            _ => {
                warn!(
                    "Null balance or 0 circulating on chain {} (bridged to {})",
                    chain, contribution.reporting_chain
                );
            }
        }
    }

    if circulating < 0.0 {
        if -circulating <= NEGATIVE_RESIDUE_TOLERANCE * gross.max(1.0) {
            debug!("Snapping float residue {} on {} to zero", circulating, chain);
            return Ok(0.0);
        }
        return Err(AppError::NegativeCirculating {
            chain: chain.to_string(),
            amount: circulating,
        });
    }

    Ok(circulating)
}
