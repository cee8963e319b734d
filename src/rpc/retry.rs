//! Retry logic utilities for RPC operations
//!
//! This module provides helper functions for implementing exponential backoff
//! retry logic and timeout wrappers for JSON-RPC requests.

use std::future::Future;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

/// Calculate next backoff duration using exponential backoff with a maximum cap
///
/// This is a pure helper function that implements the exponential backoff formula:
/// `new_backoff = min(current_backoff * multiplier, max_backoff)`
///
/// # Arguments
/// * `current_backoff` - Current backoff duration
/// * `multiplier` - Multiplier for exponential increase (typically 1.5-2.0)
/// * `max_backoff_seconds` - Maximum backoff duration in seconds
///
/// # Returns
/// New backoff duration, capped at max_backoff_seconds
///
/// # Example
/// ```
/// use std::time::Duration;
/// use pegged_supply::rpc::calculate_next_backoff;
///
/// let backoff = Duration::from_millis(100);
/// let next = calculate_next_backoff(backoff, 2.0, 30);
/// assert_eq!(next, Duration::from_millis(200));
/// ```
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff_seconds: u64,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(Duration::from_secs(max_backoff_seconds))
}

/// Run a request future under a hard timeout
///
/// # Returns
/// `Result<T, Elapsed>` - `Err` when the timeout elapsed before the request finished
///
/// # Example
/// ```
/// use pegged_supply::rpc::execute_with_timeout;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let value = execute_with_timeout(5, async { 7 }).await;
/// assert_eq!(value.unwrap(), 7);
/// # }
/// ```
pub async fn execute_with_timeout<F>(timeout_seconds: u64, operation: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    timeout(Duration::from_secs(timeout_seconds), operation).await
}
