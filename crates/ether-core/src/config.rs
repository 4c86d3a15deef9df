//! Configuration system for Ether.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $ETHER_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/ether/config.toml
//!   3. ~/.config/ether/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::wire::{ACCEPT_POLL_MILLIS, DEFAULT_CHUNK_SIZE, DEFAULT_PORT, PROBE_TIMEOUT_SECS};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EtherConfig {
    pub network: NetworkConfig,
    pub transfer: TransferConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Receiver host used by `send` and `probe`.
    pub host: String,
    /// TCP port. The receiver listens here, the sender dials it.
    pub port: u16,
    /// Connect timeout for reachability probes.
    pub probe_timeout_secs: u64,
    /// How often a waiting receiver wakes to check for cancellation.
    pub accept_poll_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Bytes read from the source file per chunk. 0 = default.
    pub chunk_size: usize,
    /// Where received files are stored. Unset means the working directory
    /// at the time of the receive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_dir: Option<PathBuf>,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            probe_timeout_secs: PROBE_TIMEOUT_SECS,
            accept_poll_millis: ACCEPT_POLL_MILLIS,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            destination_dir: None,
        }
    }
}

impl NetworkConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_millis)
    }
}

impl TransferConfig {
    /// Effective chunk size, never zero.
    pub fn chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }

    /// Effective destination directory, resolved now.
    pub fn destination_dir(&self) -> PathBuf {
        match &self.destination_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| data_dir()),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("ether")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("ether")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl EtherConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            Self::from_toml(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            EtherConfig::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("ETHER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&EtherConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply ETHER_* overrides. `lookup` is `std::env::var` outside of tests.
    /// Unparseable numeric values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ETHER_NETWORK__HOST") {
            self.network.host = v;
        }
        if let Some(p) = lookup("ETHER_NETWORK__PORT").and_then(|v| v.parse().ok()) {
            self.network.port = p;
        }
        if let Some(t) = lookup("ETHER_NETWORK__PROBE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.network.probe_timeout_secs = t;
        }
        if let Some(n) = lookup("ETHER_TRANSFER__CHUNK_SIZE").and_then(|v| v.parse().ok()) {
            self.transfer.chunk_size = n;
        }
        if let Some(v) = lookup("ETHER_TRANSFER__DESTINATION_DIR") {
            self.transfer.destination_dir = Some(PathBuf::from(v));
        }
    }
}
