use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub refresh: RefreshConfig,
    pub defaults: Defaults,
    pub logging: LoggingConfig,
}

/// Where the remote analysis service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the analysis service, without a trailing path (e.g., "http://localhost:8000").
    pub base_url: String,
    /// Transport-level timeout applied to every request. Zero disables it.
    pub request_timeout_secs: u64,
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Parameters for the visualization refresh loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Quiet period after the last selection change before charts are recomputed.
    pub debounce_ms: u64,
    /// Below this many selected variables the charts are cleared instead of fetched.
    pub min_variables: usize,
}

impl RefreshConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_variables: 2,
        }
    }
}

/// Values pre-filled into a new analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    pub stock_symbol: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            stock_symbol: "AAPL".to_string(),
        }
    }
}

/// Output format for the stderr log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
            directory: None,
        }
    }
}
