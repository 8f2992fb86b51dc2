//! Configuration for the member ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Metrics listen address
    pub metrics_listen_addr: String,

    /// RocksDB configuration
    pub rocksdb: RocksDBConfig,

    /// Writer actor configuration
    pub writers: WriterConfig,

    /// Listing defaults
    pub pagination: PaginationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/member-ledger"),
            service_name: "member-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            metrics_listen_addr: "0.0.0.0:9090".to_string(),
            rocksdb: RocksDBConfig::default(),
            writers: WriterConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocksDBConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,

    /// fsync the WAL on every ledger commit
    pub sync_writes: bool,

    /// Enable statistics
    pub enable_statistics: bool,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 3,
            max_background_jobs: 2,
            sync_writes: true,
            enable_statistics: false,
        }
    }
}

/// Writer actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Number of single-writer actors; accounts are hashed onto them
    pub shards: usize,

    /// Bounded mailbox size per actor (backpressure)
    pub mailbox_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            shards: 8,
            mailbox_capacity: 1000,
        }
    }
}

/// Pagination defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when the caller gives none
    pub default_limit: usize,

    /// Upper bound on any page size
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PaginationConfig {
    /// Effective page size for a request
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(addr) = std::env::var("LEDGER_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        if let Ok(shards) = std::env::var("LEDGER_WRITER_SHARDS") {
            config.writers.shards = shards.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_WRITER_SHARDS {:?}: {}", shards, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the ledger cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.writers.shards == 0 {
            return Err(crate::Error::Config("writers.shards must be > 0".to_string()));
        }
        if self.writers.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "writers.mailbox_capacity must be > 0".to_string(),
            ));
        }
        if self.pagination.default_limit == 0 || self.pagination.max_limit == 0 {
            return Err(crate::Error::Config("pagination limits must be > 0".to_string()));
        }
        if self.pagination.default_limit > self.pagination.max_limit {
            return Err(crate::Error::Config(
                "pagination.default_limit exceeds max_limit".to_string(),
            ));
        }
        Ok(())
    }
}
