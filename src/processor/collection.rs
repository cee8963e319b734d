//! Collection engine: runs every declared supply source and assembles chain reports

use crate::adapter::AdapterRegistry;
use crate::config::{CollectionConfig, TimeoutPolicy};
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::source::{SourceContext, SupplySource};
use crate::types::{Balance, BridgeContributionIndex, ChainReport, PegType, Role};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Raw per-chain figures plus the bridge side-table, ready for reconciliation
#[derive(Debug, Default)]
pub struct CollectedSupply {
    pub reports: BTreeMap<String, ChainReport>,
    pub bridge_index: BridgeContributionIndex,
    /// Per-source failures that were skipped; always `AppError::SourceFailure`
    pub failures: Vec<AppError>,
}

impl CollectedSupply {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Outcome of one (chain, role) task
struct SourceOutcome<'a> {
    chain: &'a str,
    role: &'a Role,
    result: SourceResult<Balance>,
    elapsed: Duration,
}

pub struct CollectionEngine {
    timeout: Duration,
    policy: TimeoutPolicy,
}

impl CollectionEngine {
    pub fn new(timeout: Duration, policy: TimeoutPolicy) -> Self {
        Self { timeout, policy }
    }

    pub fn from_config(config: &CollectionConfig) -> Self {
        Self::new(Duration::from_secs(config.timeout_seconds), config.timeout_policy)
    }

    /// Invoke every source in `registry` concurrently and wait for all of them
    ///
    /// A failing source is logged and its role omitted; siblings keep running.
    /// Only a self-bridging registry aborts collection.
    pub async fn collect(
        &self,
        registry: &AdapterRegistry,
        ctx: &SourceContext,
    ) -> AppResult<CollectedSupply> {
        registry.ensure_no_self_bridge()?;

        let peg_type = registry.peg_type;
        let started = Instant::now();
        info!(
            "Collecting {} ({}) from {} sources on {} chains",
            registry.name,
            peg_type,
            registry.source_count(),
            registry.chain_count()
        );

        let tasks = registry.chains().flat_map(|(chain, roles)| {
            let chain_ctx = ctx.for_chain(chain);
            roles.iter().map(move |(role, source)| {
                let chain_ctx = chain_ctx.clone();
                async move {
                    let begun = Instant::now();
                    let result = self
                        .guarded(chain, role, source.fetch(&chain_ctx))
                        .await;
                    SourceOutcome {
                        chain,
                        role,
                        result,
                        elapsed: begun.elapsed(),
                    }
                }
            })
        });
        let outcomes = join_all(tasks).await;

        let mut collected = CollectedSupply::default();
        for (chain, _) in registry.chains() {
            collected.reports.entry(chain.to_string()).or_default();
        }

        for outcome in outcomes {
            debug!(
                "{}:{} finished in {:.2}s",
                outcome.chain,
                outcome.role,
                outcome.elapsed.as_secs_f64()
            );
            if let Err(failure) = record_outcome(&mut collected, peg_type, registry, outcome) {
                collected.failures.push(failure);
            }
        }

        // Roles a chain does not declare are reported as zero
        for (chain, roles) in registry.chains() {
            let report = collected.reports.entry(chain.to_string()).or_default();
            for role in [Role::Minted, Role::Unreleased] {
                if !roles.contains_key(&role) {
                    report.insert(role, Balance::zero(peg_type));
                }
            }
        }

        info!(
            "Collection finished in {:.2}s: {} sources ok, {} failed",
            started.elapsed().as_secs_f64(),
            registry.source_count() - collected.failures.len(),
            collected.failures.len()
        );
        Ok(collected)
    }

    /// Apply the timeout policy to one source future
    async fn guarded<F>(&self, chain: &str, role: &Role, fetch: F) -> SourceResult<Balance>
    where
        F: Future<Output = SourceResult<Balance>>,
    {
        match self.policy {
            TimeoutPolicy::Cancel => match tokio::time::timeout(self.timeout, fetch).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout {
                    timeout_seconds: self.timeout.as_secs(),
                    operation: format!("{}:{}", chain, role),
                }),
            },
            TimeoutPolicy::Advisory => {
                tokio::pin!(fetch);
                tokio::select! {
                    result = &mut fetch => return result,
                    _ = sleep(self.timeout) => {
                        warn!(
                            "Issuance source for {}:{} exceeded the {:.0}s timeout, still waiting",
                            chain,
                            role,
                            self.timeout.as_secs_f64()
                        );
                    }
                }
                fetch.await
            }
        }
    }
}

fn record_outcome(
    collected: &mut CollectedSupply,
    peg_type: PegType,
    registry: &AdapterRegistry,
    outcome: SourceOutcome<'_>,
) -> AppResult<()> {
    let SourceOutcome {
        chain, role, result, ..
    } = outcome;
    let failure = |source: SourceError| {
        error!("Failed on {}:{}: {}", chain, role, source);
        AppError::SourceFailure {
            chain: chain.to_string(),
            role: role.to_string(),
            source,
        }
    };

    let balance = result.map_err(failure)?;
    let report = collected.reports.entry(chain.to_string()).or_default();

    if balance.is_empty() {
        report.insert(role.clone(), Balance::zero(peg_type));
        return Ok(());
    }

    match balance.get(peg_type) {
        Some(amount) if amount.is_finite() => {}
        other => {
            return Err(failure(SourceError::NotANumber(format!(
                "{} balance on chain {} is {:?}; expected a number under one of {:?}",
                peg_type,
                chain,
                other,
                PegType::ALL.iter().map(PegType::as_str).collect::<Vec<_>>()
            ))));
        }
    }

    if role.is_bridge() && !balance.has_provenance() {
        warn!(
            "Bridge data not found for {}:{} ({}); contributions carry no provenance",
            chain,
            role,
            source_kind(registry, chain, role)
        );
    }

    if let Some(origin) = role.origin() {
        collected
            .bridge_index
            .record(origin, chain, balance.clone());
    }
    report.insert(role.clone(), balance);
    Ok(())
}

fn source_kind(registry: &AdapterRegistry, chain: &str, role: &Role) -> &'static str {
    registry
        .roles_for(chain)
        .and_then(|roles| roles.get(role))
        .map(SupplySource::kind)
        .unwrap_or("unknown")
}
