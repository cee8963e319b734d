use crate::config::RpcConfig;
use crate::errors::{SourceError, SourceResult};
use crate::rpc::{calculate_next_backoff, execute_with_timeout};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// `totalSupply()`
pub const TOTAL_SUPPLY_SELECTOR: &str = "0x18160ddd";
/// `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: &str = "0x70a08231";
/// `decimals()`
pub const DECIMALS_SELECTOR: &str = "0x313ce567";

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// EVM JSON-RPC client with retry logic and a concurrency limit
#[derive(Clone)]
pub struct EvmRpcClient {
    http: reqwest::Client,
    chain: String,
    url: String,
    config: RpcConfig,
    semaphore: Arc<Semaphore>,
    next_id: Arc<AtomicU64>,
    error_count: Arc<AtomicU64>,
}

impl EvmRpcClient {
    /// Create a client for one chain's endpoint
    pub fn new(chain: &str, url: &str, config: RpcConfig) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| SourceError::CallFailed {
                method: "client_builder".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::with_http_client(http, chain, url, config))
    }

    /// Create a client sharing an existing HTTP connection pool
    pub fn with_http_client(
        http: reqwest::Client,
        chain: &str,
        url: &str,
        config: RpcConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrent_requests.max(1)));
        Self {
            http,
            chain: chain.to_string(),
            url: url.to_string(),
            config,
            semaphore,
            next_id: Arc::new(AtomicU64::new(1)),
            error_count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Get the current error count from RPC operations
    pub fn get_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// `eth_call` against `to` with ABI-encoded `data`, at `block` or latest
    pub async fn eth_call(&self, to: &str, data: &str, block: Option<u64>) -> SourceResult<String> {
        let block_tag = block_tag(block);
        let result = self
            .call_with_retry("eth_call", json!([{ "to": to, "data": data }, block_tag]))
            .await?;
        match result {
            Value::String(hex) if hex.len() > 2 => Ok(hex),
            other => Err(SourceError::InvalidResponse(format!(
                "eth_call to {} on {} returned {}",
                to, self.chain, other
            ))),
        }
    }

    /// Latest block height
    pub async fn block_number(&self) -> SourceResult<u64> {
        let result = self.call_with_retry("eth_blockNumber", json!([])).await?;
        let hex = result.as_str().ok_or_else(|| {
            SourceError::InvalidResponse(format!("eth_blockNumber returned {}", result))
        })?;
        let height = crate::utils::units::hex_quantity_to_u128(hex)?;
        u64::try_from(height)
            .map_err(|_| SourceError::InvalidResponse(format!("block height {} too large", hex)))
    }

    async fn call_with_retry(&self, method: &str, params: Value) -> SourceResult<Value> {
        let _permit = self.semaphore.acquire().await.map_err(|e| SourceError::CallFailed {
            method: method.to_string(),
            message: format!("Failed to acquire semaphore: {}", e),
        })?;

        let mut attempts = 0;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);
        let max_retries = self.config.max_retries.max(1);

        loop {
            let outcome = execute_with_timeout(
                self.config.request_timeout_seconds,
                self.send(method, &params),
            )
            .await;

            let err = match outcome {
                Ok(Ok(value)) => {
                    if attempts > 0 {
                        debug!(
                            "{} on {} succeeded after {} attempts",
                            method,
                            self.chain,
                            attempts + 1
                        );
                    }
                    return Ok(value);
                }
                Ok(Err(e)) => e,
                Err(_) => SourceError::Timeout {
                    timeout_seconds: self.config.request_timeout_seconds,
                    operation: format!("{} on {}", method, self.chain),
                },
            };

            attempts += 1;
            self.error_count.fetch_add(1, Ordering::Relaxed);

            if !is_retryable(&err) {
                debug!("{} on {} failed (non-retryable): {}", method, self.chain, err);
                return Err(err);
            }

            if attempts >= max_retries {
                error!(
                    "{} on {} failed after {} attempts: {}",
                    method, self.chain, attempts, err
                );
                return Err(SourceError::MaxRetriesExceeded {
                    operation: format!("{} on {}", method, self.chain),
                });
            }

            warn!(
                "RPC attempt {} of {} on {} failed, retrying in {:?}: {}",
                attempts, method, self.chain, backoff, err
            );
            sleep(backoff).await;
            backoff = calculate_next_backoff(
                backoff,
                self.config.backoff_multiplier,
                self.config.max_backoff_seconds,
            );
        }
    }

    async fn send(&self, method: &str, params: &Value) -> SourceResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::CallFailed {
                method: method.to_string(),
                message: format!("HTTP {} from {}", status, self.url),
            });
        }

        let envelope: RpcResponse = response.json().await.map_err(|e| {
            SourceError::InvalidResponse(format!("Malformed JSON-RPC response: {}", e))
        })?;
        parse_envelope(method, envelope)
    }
}

fn parse_envelope(method: &str, envelope: RpcResponse) -> SourceResult<Value> {
    if let Some(err) = envelope.error {
        return Err(SourceError::CallFailed {
            method: method.to_string(),
            message: format!("node error {}: {}", err.code, err.message),
        });
    }
    envelope
        .result
        .ok_or_else(|| SourceError::InvalidResponse(format!("{} returned no result", method)))
}

fn block_tag(block: Option<u64>) -> Value {
    match block {
        Some(height) => Value::String(format!("0x{:x}", height)),
        None => Value::String("latest".to_string()),
    }
}

/// Reverts and malformed payloads will not improve on retry
fn is_retryable(err: &SourceError) -> bool {
    match err {
        SourceError::CallFailed { message, .. } => {
            let message = message.to_lowercase();
            !(message.contains("execution reverted") || message.contains("invalid argument"))
        }
        SourceError::InvalidResponse(_) | SourceError::Units(_) => false,
        _ => true,
    }
}

/// ABI-encode `balanceOf(owner)` call data
pub fn encode_balance_of(owner: &str) -> SourceResult<String> {
    let stripped = owner
        .strip_prefix("0x")
        .or_else(|| owner.strip_prefix("0X"))
        .unwrap_or(owner);
    let bytes = hex::decode(stripped)
        .map_err(|e| SourceError::InvalidResponse(format!("Invalid address {}: {}", owner, e)))?;
    if bytes.len() != 20 {
        return Err(SourceError::InvalidResponse(format!(
            "Address {} is {} bytes, expected 20",
            owner,
            bytes.len()
        )));
    }
    Ok(format!(
        "{}{}{}",
        BALANCE_OF_SELECTOR,
        "0".repeat(24),
        hex::encode(bytes)
    ))
}
