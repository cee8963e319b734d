//! Common Test Utilities
//!
//! In-memory chain APIs and registry builders shared by the unit and
//! integration suites. Nothing here touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use pegged_supply::adapter::AdapterRegistry;
use pegged_supply::errors::{SourceError, SourceResult};
use pegged_supply::source::{ChainApi, ChainApiProvider, CustomSource, SourceContext, SupplySource};
use pegged_supply::types::{Balance, PegType, Role};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Deterministic, valid EVM address for index `n`
pub fn address(n: u32) -> String {
    format!("0x{:040x}", n)
}

/// Token state for one chain
#[derive(Default)]
pub struct MockChainApi {
    chain: String,
    supplies: HashMap<String, u128>,
    balances: HashMap<(String, String), u128>,
    decimals: HashMap<String, u32>,
    failing: Vec<String>,
    delay: Duration,
    calls: AtomicU64,
}

impl MockChainApi {
    pub fn new(chain: &str) -> Self {
        Self {
            chain: chain.to_string(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: &str, supply: u128, decimals: u32) -> Self {
        self.supplies.insert(token.to_lowercase(), supply);
        self.decimals.insert(token.to_lowercase(), decimals);
        self
    }

    pub fn with_balance(mut self, token: &str, owner: &str, amount: u128) -> Self {
        self.balances
            .insert((token.to_lowercase(), owner.to_lowercase()), amount);
        self
    }

    /// Every call against `token` fails like an unreachable node
    pub fn with_failing_token(mut self, token: &str) -> Self {
        self.failing.push(token.to_lowercase());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, method: &str, token: &str) -> SourceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let token = token.to_lowercase();
        if self.failing.contains(&token) {
            return Err(SourceError::CallFailed {
                method: method.to_string(),
                message: format!("connection refused for {} on {}", token, self.chain),
            });
        }
        Ok(token)
    }
}

#[async_trait]
impl ChainApi for MockChainApi {
    fn chain(&self) -> &str {
        &self.chain
    }

    async fn total_supply(&self, token: &str) -> SourceResult<u128> {
        let token = self.enter("totalSupply", token).await?;
        self.supplies
            .get(&token)
            .copied()
            .ok_or_else(|| SourceError::CallFailed {
                method: "totalSupply".to_string(),
                message: "execution reverted".to_string(),
            })
    }

    async fn balance_of(&self, token: &str, owner: &str) -> SourceResult<u128> {
        let token = self.enter("balanceOf", token).await?;
        Ok(self
            .balances
            .get(&(token, owner.to_lowercase()))
            .copied()
            .unwrap_or(0))
    }

    async fn decimals(&self, token: &str) -> SourceResult<u32> {
        let token = self.enter("decimals", token).await?;
        self.decimals
            .get(&token)
            .copied()
            .ok_or_else(|| SourceError::MissingDecimals {
                chain: self.chain.clone(),
                token,
            })
    }
}

/// Chain name → mock API
#[derive(Default)]
pub struct MockProvider {
    apis: BTreeMap<String, Arc<MockChainApi>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, api: MockChainApi) -> Self {
        self.apis.insert(api.chain.clone(), Arc::new(api));
        self
    }

    pub fn api(&self, chain: &str) -> Arc<MockChainApi> {
        Arc::clone(&self.apis[chain])
    }
}

impl ChainApiProvider for MockProvider {
    fn api_for(&self, chain: &str) -> SourceResult<Arc<dyn ChainApi>> {
        self.apis
            .get(chain)
            .map(|api| Arc::clone(api) as Arc<dyn ChainApi>)
            .ok_or_else(|| SourceError::UnknownChain(chain.to_string()))
    }
}

pub fn context(provider: Arc<dyn ChainApiProvider>) -> SourceContext {
    SourceContext::new("", TEST_TIMESTAMP, None, BTreeMap::new(), provider)
}

pub fn offline_context() -> SourceContext {
    context(Arc::new(MockProvider::new()))
}

pub fn fixed(peg_type: PegType, amount: f64) -> SupplySource {
    SupplySource::Fixed {
        peg_type,
        amount,
        label: None,
    }
}

/// Custom source that sleeps, then returns a canned result
pub struct CannedSource {
    pub delay: Duration,
    pub result: fn() -> SourceResult<Balance>,
}

#[async_trait]
impl CustomSource for CannedSource {
    fn name(&self) -> &str {
        "canned"
    }

    async fn fetch(&self, _ctx: &SourceContext) -> SourceResult<Balance> {
        tokio::time::sleep(self.delay).await;
        (self.result)()
    }
}

pub fn canned(delay_ms: u64, result: fn() -> SourceResult<Balance>) -> SupplySource {
    SupplySource::Custom(Arc::new(CannedSource {
        delay: Duration::from_millis(delay_ms),
        result,
    }))
}

/// Registry from `(chain, role, amount)` triples of fixed USD figures
pub fn usd_registry(entries: &[(&str, &str, f64)]) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new("test-usd", PegType::Usd);
    for (chain, role, amount) in entries {
        registry
            .insert(chain, Role::from(*role), fixed(PegType::Usd, *amount))
            .unwrap();
    }
    registry
}
