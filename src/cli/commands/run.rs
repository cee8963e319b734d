use crate::adapter::{ensure_valid, AdapterDefinition};
use crate::config::{AppConfig, TimeoutPolicy};
use crate::errors::{AppError, AppResult};
use crate::processor::SupplyPipeline;
use crate::reports::{OutputFormat, ReportFormatter};
use crate::rpc::SdkCache;
use crate::source::{RpcChainApiProvider, SourceContext};
use crate::types::PegType;
use crate::utils::time::{default_run_timestamp, timestamp_to_iso, unix_now};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Compute the circulating supply of one pegged asset
#[derive(Args)]
pub struct RunCommand {
    /// Adapter definition file (TOML)
    pub adapter: PathBuf,

    /// Peg type to reconcile (defaults to the adapter's own)
    pub peg_type: Option<PegType>,

    /// Output format: console, json or csv
    #[arg(long, default_value = "console")]
    pub format: OutputFormat,

    /// Unix timestamp of the run (defaults to now minus 60 seconds)
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Pin a chain to a block height, e.g. --block ethereum=19000000
    #[arg(long = "block", value_parser = parse_chain_block)]
    pub blocks: Vec<(String, u64)>,

    /// Do not read or write the on-disk cache
    #[arg(long)]
    pub no_cache: bool,

    /// Per-source timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Abandon sources that exceed the timeout instead of waiting
    #[arg(long)]
    pub cancel_on_timeout: bool,
}

fn parse_chain_block(value: &str) -> Result<(String, u64), String> {
    let (chain, height) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <chain>=<height>, got '{}'", value))?;
    let height = height
        .parse::<u64>()
        .map_err(|e| format!("invalid block height '{}': {}", height, e))?;
    Ok((chain.to_string(), height))
}

impl RunCommand {
    pub async fn run(&self) -> AppResult<()> {
        let mut app_config = match AppConfig::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load configuration: {}", e);
                info!("Using defaults and CLI arguments");
                AppConfig::get_defaults()?
            }
        };

        // CLI arguments override config values
        if let Some(timeout) = self.timeout_seconds {
            app_config.collection.timeout_seconds = timeout;
        }
        if self.cancel_on_timeout {
            app_config.collection.timeout_policy = TimeoutPolicy::Cancel;
        }
        let use_cache = app_config.cache.enabled && !self.no_cache;

        let definition = AdapterDefinition::load(&self.adapter)?;
        ensure_valid(&definition)?;
        let peg_type = self.peg_type.unwrap_or(definition.peg_type);
        let registry = definition.into_registry(peg_type)?;
        if registry.is_empty() {
            return Err(AppError::Configuration(format!(
                "Adapter {} declares no supply sources",
                registry.name
            )));
        }

        let timestamp = self.timestamp.unwrap_or_else(default_run_timestamp);
        let chain_blocks: BTreeMap<String, u64> = self.blocks.iter().cloned().collect();
        let reference_block = chain_blocks.get("ethereum").copied();

        info!("Configuration:");
        info!("  Adapter: {}", self.adapter.display());
        info!("  Peg type: {}", peg_type);
        info!("  Timestamp: {} ({})", timestamp, timestamp_to_iso(timestamp));
        info!(
            "  Timeout: {}s ({:?})",
            app_config.collection.timeout_seconds, app_config.collection.timeout_policy
        );
        info!("  Cache: {}", if use_cache { "enabled" } else { "disabled" });

        let cache = if use_cache {
            SdkCache::load(&app_config.cache.path, app_config.cache.max_age_days)
        } else {
            SdkCache::new(unix_now())
        };

        let provider = RpcChainApiProvider::new(
            app_config.rpc.clone(),
            cache.clone(),
            chain_blocks.clone(),
        )
        .map_err(|e| AppError::Config(format!("Failed to initialise RPC clients: {}", e)))?;
        let ctx = SourceContext::new(
            "",
            timestamp,
            reference_block,
            chain_blocks,
            Arc::new(provider),
        );

        let outcome = SupplyPipeline::new(&app_config.collection)
            .run(&registry, &ctx)
            .await?;

        println!("{}", ReportFormatter::format(&outcome.report, self.format)?);

        if !outcome.failures.is_empty() {
            eprintln!("\n{} source(s) failed and were skipped:", outcome.failures.len());
            for failure in &outcome.failures {
                eprintln!("  {}", failure);
            }
        }

        if use_cache {
            cache.save(&app_config.cache.path)?;
            let stats = cache.get_stats();
            info!(
                "Cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
                cache.len(),
                stats.hits,
                stats.misses,
                stats.hit_rate()
            );
        }

        info!("Run completed in {:.2}s", outcome.elapsed_seconds);
        Ok(())
    }
}
