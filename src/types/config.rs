use serde::{Deserialize, Serialize};

/// Top-level host configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct HostConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub setup: SetupConfig,
    pub favicon: FaviconConfig,
}

/// Where the synced store lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; `None` uses `bars.db` in the platform data directory.
    pub database_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Page-readiness retry policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SetupConfig {
    pub max_attempts: u32,
    pub retry_delays_ms: Vec<u64>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            retry_delays_ms: vec![100, 300, 500, 1000, 2000, 3000],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FaviconConfig {
    pub probe_enabled: bool,
    pub probe_timeout_ms: u64,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            probe_enabled: true,
            probe_timeout_ms: 3000,
        }
    }
}
