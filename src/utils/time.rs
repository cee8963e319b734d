//! Time utilities for run timestamps and cache expiry

use chrono::{TimeZone, Utc};

/// Seconds in a day (24 × 60 × 60)
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Lag applied to the default run timestamp so every chain has produced a block
pub const DEFAULT_TIMESTAMP_LAG_SECONDS: i64 = 60;

/// Current Unix timestamp in seconds
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Default run timestamp: one minute in the past
pub fn default_run_timestamp() -> i64 {
    unix_now() - DEFAULT_TIMESTAMP_LAG_SECONDS
}

/// Convert Unix timestamp to ISO 8601 datetime string
///
/// Returns "1970-01-01T00:00:00Z" for invalid timestamps.
///
/// # Examples
/// ```
/// use pegged_supply::utils::time::timestamp_to_iso;
/// assert_eq!(timestamp_to_iso(0), "1970-01-01T00:00:00Z");
/// assert_eq!(timestamp_to_iso(1704067200), "2024-01-01T00:00:00Z");
/// ```
pub fn timestamp_to_iso(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string())
}

/// Whether `started_at` is more than `max_age_days` before `now`
pub fn is_older_than(started_at: i64, now: i64, max_age_days: u64) -> bool {
    now - started_at > max_age_days as i64 * SECONDS_PER_DAY
}
