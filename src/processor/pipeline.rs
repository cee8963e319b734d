use crate::adapter::AdapterRegistry;
use crate::config::CollectionConfig;
use crate::errors::{AppError, AppResult};
use crate::processor::{CollectionEngine, ReconciliationEngine};
use crate::source::SourceContext;
use crate::types::GlobalReport;
use std::time::Instant;
use tracing::info;

/// Validated report plus the per-source failures skipped along the way
#[derive(Debug)]
pub struct RunOutcome {
    pub report: GlobalReport,
    pub failures: Vec<AppError>,
    pub elapsed_seconds: f64,
}

/// Collection followed by reconciliation for one asset
pub struct SupplyPipeline {
    collection: CollectionEngine,
    sanity_ceiling: f64,
}

impl SupplyPipeline {
    pub fn new(config: &CollectionConfig) -> Self {
        Self {
            collection: CollectionEngine::from_config(config),
            sanity_ceiling: config.sanity_ceiling,
        }
    }

    pub fn with_engine(collection: CollectionEngine, sanity_ceiling: f64) -> Self {
        Self {
            collection,
            sanity_ceiling,
        }
    }

    /// Collect every source, then reconcile
    ///
    /// Reconciliation starts only once every collection task has completed or
    /// been recorded as failed.
    pub async fn run(&self, registry: &AdapterRegistry, ctx: &SourceContext) -> AppResult<RunOutcome> {
        let started = Instant::now();
        info!("=== Pegged Supply - {} ===", registry.name);

        let mut collected = self.collection.collect(registry, ctx).await?;
        let failures = std::mem::take(&mut collected.failures);

        let report = ReconciliationEngine::new(registry.peg_type, self.sanity_ceiling)
            .reconcile(collected, ctx.timestamp)?;

        Ok(RunOutcome {
            report,
            failures,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}
