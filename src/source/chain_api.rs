//! Chain-bound API handles used by the on-chain supply sources

use crate::config::RpcConfig;
use crate::errors::{SourceError, SourceResult};
use crate::rpc::cache::decimals_key;
use crate::rpc::client::{encode_balance_of, DECIMALS_SELECTOR, TOTAL_SUPPLY_SELECTOR};
use crate::rpc::{EvmRpcClient, SdkCache};
use crate::utils::units::hex_quantity_to_u128;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Read access to ERC-20 style token state on one chain
///
/// Amounts are raw integers in the token's smallest unit.
#[async_trait]
pub trait ChainApi: Send + Sync {
    fn chain(&self) -> &str;

    async fn total_supply(&self, token: &str) -> SourceResult<u128>;

    async fn balance_of(&self, token: &str, owner: &str) -> SourceResult<u128>;

    async fn decimals(&self, token: &str) -> SourceResult<u32>;
}

/// Resolves a chain name to its API handle
pub trait ChainApiProvider: Send + Sync {
    fn api_for(&self, chain: &str) -> SourceResult<Arc<dyn ChainApi>>;
}

/// `ChainApi` over an EVM JSON-RPC endpoint
pub struct EvmChainApi {
    client: EvmRpcClient,
    cache: SdkCache,
    block: Option<u64>,
}

impl EvmChainApi {
    pub fn new(client: EvmRpcClient, cache: SdkCache, block: Option<u64>) -> Self {
        Self {
            client,
            cache,
            block,
        }
    }

    async fn call_quantity(&self, token: &str, data: &str) -> SourceResult<u128> {
        let raw = self.client.eth_call(token, data, self.block).await?;
        Ok(hex_quantity_to_u128(&raw)?)
    }
}

#[async_trait]
impl ChainApi for EvmChainApi {
    fn chain(&self) -> &str {
        self.client.chain()
    }

    async fn total_supply(&self, token: &str) -> SourceResult<u128> {
        self.call_quantity(token, TOTAL_SUPPLY_SELECTOR).await
    }

    async fn balance_of(&self, token: &str, owner: &str) -> SourceResult<u128> {
        let data = encode_balance_of(owner)?;
        self.call_quantity(token, &data).await
    }

    async fn decimals(&self, token: &str) -> SourceResult<u32> {
        let key = decimals_key(self.chain(), token);
        if let Some(cached) = self.cache.get(&key).and_then(|v| v.parse::<u32>().ok()) {
            return Ok(cached);
        }

        // Decimals do not change with block height, query at latest
        let raw = self.client.eth_call(token, DECIMALS_SELECTOR, None).await?;
        let decimals = hex_quantity_to_u128(&raw)?;
        let decimals = u32::try_from(decimals).map_err(|_| SourceError::MissingDecimals {
            chain: self.chain().to_string(),
            token: token.to_string(),
        })?;
        self.cache.put(key, decimals.to_string());
        Ok(decimals)
    }
}

/// Builds `EvmChainApi` handles lazily from configured endpoints
pub struct RpcChainApiProvider {
    config: RpcConfig,
    cache: SdkCache,
    chain_blocks: BTreeMap<String, u64>,
    http: reqwest::Client,
    apis: Mutex<HashMap<String, Arc<dyn ChainApi>>>,
}

impl RpcChainApiProvider {
    pub fn new(
        config: RpcConfig,
        cache: SdkCache,
        chain_blocks: BTreeMap<String, u64>,
    ) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| SourceError::CallFailed {
                method: "client_builder".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            config,
            cache,
            chain_blocks,
            http,
            apis: Mutex::new(HashMap::new()),
        })
    }
}

impl ChainApiProvider for RpcChainApiProvider {
    fn api_for(&self, chain: &str) -> SourceResult<Arc<dyn ChainApi>> {
        let mut apis = self.apis.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(api) = apis.get(chain) {
            return Ok(Arc::clone(api));
        }

        let url = self
            .config
            .endpoint_for(chain)
            .ok_or_else(|| SourceError::UnknownChain(chain.to_string()))?;
        debug!("Creating RPC handle for {} at {}", chain, url);

        let client =
            EvmRpcClient::with_http_client(self.http.clone(), chain, &url, self.config.clone());
        let api: Arc<dyn ChainApi> = Arc::new(EvmChainApi::new(
            client,
            self.cache.clone(),
            self.chain_blocks.get(chain).copied(),
        ));
        apis.insert(chain.to_string(), Arc::clone(&api));
        Ok(api)
    }
}
