//! Relay configuration loaded from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use saga::services::ledger::DEFAULT_CAPACITY;
use saga::{SagaError, TopologyConfig};

/// Relay configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `SAGA_TOPOLOGY_PATH`: JSON topology document (default: built-in deployment)
/// - `RELAY_METRICS_ADDR`: Prometheus listener address (default: disabled)
/// - `RELAY_LEDGER_CAPACITY`: redelivery claims and closed sagas remembered (default: 65536)
/// - `RELAY_LOG_JSON`: `true` for JSON log lines (default: `false`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub topology_path: Option<PathBuf>,
    pub metrics_addr: Option<SocketAddr>,
    pub ledger_capacity: usize,
    pub log_json: bool,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    ///
    /// An unparsable metrics address disables the listener with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let metrics_addr = lookup("RELAY_METRICS_ADDR").and_then(|raw| {
            raw.parse()
                .inspect_err(|error| {
                    tracing::warn!(%raw, %error, "ignoring invalid RELAY_METRICS_ADDR");
                })
                .ok()
        });

        Self {
            topology_path: lookup("SAGA_TOPOLOGY_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            metrics_addr,
            ledger_capacity: lookup("RELAY_LEDGER_CAPACITY")
                .and_then(|raw| raw.trim().parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_CAPACITY),
            log_json: lookup("RELAY_LOG_JSON")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Returns the topology description to build: the configured document,
    /// or the built-in deployment when none is set.
    pub fn topology(&self) -> Result<TopologyConfig, SagaError> {
        match &self.topology_path {
            Some(path) => TopologyConfig::load(path),
            None => Ok(TopologyConfig::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topology_path: None,
            metrics_addr: None,
            ledger_capacity: DEFAULT_CAPACITY,
            log_json: false,
            log_level: "info".to_string(),
        }
    }
}
