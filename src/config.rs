use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from pegged-supply.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub collection: CollectionConfig,
    pub rpc: RpcConfig,
    pub cache: CacheConfig,
}

/// How a source that overruns its time budget is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Log a warning and keep waiting for the source to finish
    #[default]
    Advisory,
    /// Abandon the source and record it as failed
    Cancel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub timeout_seconds: u64,
    pub timeout_policy: TimeoutPolicy,
    pub sanity_ceiling: f64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            timeout_policy: TimeoutPolicy::Advisory,
            sanity_ceiling: 1000e9,
        }
    }
}

/// EVM JSON-RPC configuration used by the on-chain supply sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub endpoints: BTreeMap<String, String>,
    pub request_timeout_seconds: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
    pub concurrent_requests: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoints: BTreeMap::new(),
            request_timeout_seconds: 30,
            max_retries: 5,
            initial_backoff_ms: 200,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 10,
            concurrent_requests: 8,
        }
    }
}

impl RpcConfig {
    /// Resolve the endpoint for a chain.
    ///
    /// Explicit configuration wins, then the `<CHAIN>_RPC` environment variable.
    /// Comma-separated env values use the first URL.
    pub fn endpoint_for(&self, chain: &str) -> Option<String> {
        if let Some(url) = self.endpoints.get(chain) {
            return Some(url.clone());
        }
        let var = format!("{}_RPC", chain.to_uppercase());
        env::var(var).ok().and_then(|value| {
            value
                .split(',')
                .map(str::trim)
                .find(|url| !url.is_empty())
                .map(str::to_string)
        })
    }
}

/// On-disk cache for immutable on-chain lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub max_age_days: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("pegged-assets-cache/sdk-cache.json"),
            max_age_days: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from pegged-supply.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let collection = CollectionConfig::default();
        let rpc = RpcConfig::default();
        let cache = CacheConfig::default();

        let config = Config::builder()
            .set_default("collection.timeout_seconds", collection.timeout_seconds)?
            .set_default("collection.timeout_policy", "advisory")?
            .set_default("collection.sanity_ceiling", collection.sanity_ceiling)?
            .set_default(
                "rpc.endpoints",
                config::Map::<String, config::Value>::new(),
            )?
            .set_default("rpc.request_timeout_seconds", rpc.request_timeout_seconds)?
            .set_default("rpc.max_retries", rpc.max_retries as i64)?
            .set_default("rpc.initial_backoff_ms", rpc.initial_backoff_ms)?
            .set_default("rpc.backoff_multiplier", rpc.backoff_multiplier)?
            .set_default("rpc.max_backoff_seconds", rpc.max_backoff_seconds)?
            .set_default("rpc.concurrent_requests", rpc.concurrent_requests as i64)?
            .set_default("cache.enabled", cache.enabled)?
            .set_default("cache.path", cache.path.to_string_lossy().to_string())?
            .set_default("cache.max_age_days", cache.max_age_days)?
            // Load from pegged-supply.toml if it exists
            .add_source(File::with_name("pegged-supply").required(false))
            // PEGGED_COLLECTION__TIMEOUT_SECONDS=90, PEGGED_RPC__ENDPOINTS__ETHEREUM=...
            .add_source(
                config::Environment::with_prefix("PEGGED")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;

        if app_config.collection.sanity_ceiling <= 0.0
            || !app_config.collection.sanity_ceiling.is_finite()
        {
            return Err(ConfigError::Message(format!(
                "collection.sanity_ceiling must be a positive number, got {}",
                app_config.collection.sanity_ceiling
            )));
        }
        if app_config.rpc.concurrent_requests == 0 {
            return Err(ConfigError::Message(
                "rpc.concurrent_requests must be greater than 0".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// Get default config values, falling back when no config can be loaded
    pub fn get_defaults() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self {
                collection: CollectionConfig::default(),
                rpc: RpcConfig::default(),
                cache: CacheConfig::default(),
            }),
        }
    }
}
