use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// A single (chain, role) supply source failed or returned invalid data
    #[error("Source failure on {chain}:{role}: {source}")]
    SourceFailure {
        chain: String,
        role: String,
        #[source]
        source: SourceError,
    },

    /// Malformed adapter definition (self-bridge, bad address, unknown chain)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reconciliation produced a negative circulating figure for a chain
    #[error("Pegged asset on chain {chain} has negative circulating amount ({amount})")]
    NegativeCirculating { chain: String, amount: f64 },

    /// Global total is zero, missing, or non-numeric
    #[error("Invalid total circulating: {0}")]
    ZeroOrMissingTotal(String),

    /// Global total exceeds the plausibility ceiling
    #[error("Pegged asset total circulating {total} is over the sanity ceiling of {ceiling}")]
    SanityCeiling { total: f64, ceiling: f64 },

    /// Settings loading issues
    #[error("Settings error: {0}")]
    Config(String),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON report export and cache files
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Adapter file parsing
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Fixed-point conversion
    #[error("Unit conversion error: {0}")]
    Units(#[from] UnitsError),
}

impl AppError {
    /// Whether this error must abort a run.
    ///
    /// Only per-source failures are recoverable; they are contained at the
    /// collection boundary and never reach the caller as errors.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::SourceFailure { .. })
    }
}

/// Per-source error types
#[derive(Error, Debug)]
pub enum SourceError {
    /// No RPC endpoint is known for the chain
    #[error("No RPC endpoint configured for chain {0}")]
    UnknownChain(String),

    /// JSON-RPC method call failed (network errors, HTTP status, node error)
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// Node returned unexpected or malformed response data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Retry limit exceeded for RPC operation
    #[error("Max retries exceeded: {operation}")]
    MaxRetriesExceeded { operation: String },

    /// Request or source timed out
    #[error("Timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// Source produced a value that is not a finite number
    #[error("Amount is not a number: {0}")]
    NotANumber(String),

    /// Token decimals could not be determined
    #[error("Missing decimals for token {token} on {chain}")]
    MissingDecimals { chain: String, token: String },

    /// Raw amount failed fixed-point conversion
    #[error("Unit conversion failed: {0}")]
    Units(#[from] UnitsError),

    /// Free-form failure from a custom source
    #[error("Custom source failed: {0}")]
    Custom(String),
}

/// Fixed-point conversion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid digit in amount: {0}")]
    InvalidDigit(String),

    #[error("Unsupported decimals: {0}")]
    UnsupportedDecimals(u32),

    #[error("Quantity overflows 128 bits: {0}")]
    Overflow(String),

    #[error("Amount is not finite: {0}")]
    NonFinite(String),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for supply source operations
pub type SourceResult<T> = Result<T, SourceError>;

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<glob::PatternError> for AppError {
    fn from(err: glob::PatternError) -> Self {
        AppError::Config(format!("Glob pattern error: {}", err))
    }
}

impl From<glob::GlobError> for AppError {
    fn from(err: glob::GlobError) -> Self {
        AppError::Config(format!("Glob error: {}", err))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout {
                timeout_seconds: 0,
                operation: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "http request".to_string()),
            }
        } else {
            SourceError::CallFailed {
                method: "http".to_string(),
                message: err.to_string(),
            }
        }
    }
}
