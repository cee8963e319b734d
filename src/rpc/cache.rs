use crate::errors::AppResult;
use crate::utils::time::{is_older_than, unix_now};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Serialised layout of the cache file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    start_time: i64,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Thread-safe cache of immutable on-chain lookups (token decimals)
///
/// Supply figures are never cached; they change block to block.
#[derive(Clone)]
pub struct SdkCache {
    file: Arc<Mutex<CacheFile>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl SdkCache {
    /// Create a new empty cache started at `start_time`
    pub fn new(start_time: i64) -> Self {
        Self {
            file: Arc::new(Mutex::new(CacheFile {
                start_time,
                entries: BTreeMap::new(),
            })),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load the cache file, starting fresh when it is missing, unreadable,
    /// or older than `max_age_days`
    pub fn load(path: &Path, max_age_days: u64) -> Self {
        let now = unix_now();
        let loaded = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str::<CacheFile>(&content).ok());

        match loaded {
            Some(file) if !is_older_than(file.start_time, now, max_age_days) => {
                info!(
                    "Loaded {} cached entries from {}",
                    file.entries.len(),
                    path.display()
                );
                Self {
                    file: Arc::new(Mutex::new(file)),
                    hits: Arc::new(AtomicU64::new(0)),
                    misses: Arc::new(AtomicU64::new(0)),
                }
            }
            Some(_) => {
                info!("Cache at {} is older than {} days, resetting", path.display(), max_age_days);
                Self::new(now)
            }
            None => {
                debug!("No usable cache at {}, starting fresh", path.display());
                Self::new(now)
            }
        }
    }

    /// Write the cache file, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string(&*self.lock())?;
        fs::write(path, content)?;
        debug!("Saved cache to {}", path.display());
        Ok(())
    }

    /// Get a cached value if it exists
    pub fn get(&self, key: &str) -> Option<String> {
        match self.lock().entries.get(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for {}", key);
                Some(value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for {}", key);
                None
            }
        }
    }

    /// Store a value in the cache
    pub fn put(&self, key: String, value: String) {
        debug!("Cached {}", key);
        self.lock().entries.insert(key, value);
    }

    pub fn start_time(&self) -> i64 {
        self.lock().start_time
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheFile> {
        self.file.lock().unwrap_or_else(|poisoned| {
            warn!("Cache lock was poisoned, continuing with inner state");
            poisoned.into_inner()
        })
    }
}

impl Default for SdkCache {
    fn default() -> Self {
        Self::new(unix_now())
    }
}

/// Key for a token's decimals on a chain
pub fn decimals_key(chain: &str, token: &str) -> String {
    format!("{}:decimals:{}", chain, token.to_lowercase())
}

/// Cache performance statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            (self.hits as f64 / (self.hits + self.misses) as f64) * 100.0
        }
    }

    /// Get total cache requests
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
