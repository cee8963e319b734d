//! EVM JSON-RPC integration module
//!
//! This module provides the network plumbing behind the on-chain supply sources:
//! - **Client** - Async JSON-RPC client with retry logic and a concurrency limit
//! - **Cache** - On-disk cache of immutable lookups such as token decimals
//! - **Retry** - Exponential backoff retry utilities and timeout wrappers

pub mod cache;
pub mod client;
pub mod retry;

// Re-export main types
pub use cache::{CacheStats, SdkCache};
pub use client::EvmRpcClient;
pub use retry::{calculate_next_backoff, execute_with_timeout};
