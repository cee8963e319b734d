use anyhow::Result;
use pegged_supply::config::RpcConfig;
use pegged_supply::rpc::cache::decimals_key;
use pegged_supply::rpc::{EvmRpcClient, SdkCache};
use pegged_supply::source::{ChainApi, EvmChainApi};
use pegged_supply::utils::time::unix_now;
use tempfile::TempDir;

/// Endpoint nothing listens on
const DEAD_ENDPOINT: &str = "http://127.0.0.1:9";

fn offline_config() -> RpcConfig {
    RpcConfig {
        request_timeout_seconds: 2,
        max_retries: 1,
        initial_backoff_ms: 1,
        ..RpcConfig::default()
    }
}

#[tokio::test]
async fn test_persisted_decimals_survive_a_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("pegged-assets-cache").join("sdk-cache.json");
    let token = "0xC5F0F7B66764F6EC8C8DFF7BA683102295E16409";

    let first_run = SdkCache::new(unix_now());
    first_run.put(decimals_key("bsc", token), "18".to_string());
    first_run.save(&path)?;

    let second_run = SdkCache::load(&path, 30);
    let client = EvmRpcClient::new("bsc", DEAD_ENDPOINT, offline_config())?;
    let api = EvmChainApi::new(client, second_run.clone(), None);

    // Served from the cache; the endpoint is never reached
    assert_eq!(api.decimals(&token.to_lowercase()).await?, 18);
    assert_eq!(second_run.get_stats().hits, 1);
    Ok(())
}

#[tokio::test]
async fn test_uncached_lookup_fails_against_dead_endpoint() -> Result<()> {
    let cache = SdkCache::new(unix_now());
    let client = EvmRpcClient::new("bsc", DEAD_ENDPOINT, offline_config())?;
    let api = EvmChainApi::new(client, cache.clone(), None);

    assert!(api.decimals("0xc5f0f7b66764f6ec8c8dff7ba683102295e16409").await.is_err());
    assert!(cache.is_empty());
    assert_eq!(cache.get_stats().misses, 1);
    Ok(())
}
