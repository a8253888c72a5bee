//! CLI configuration loading and management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sigil_core::{ChallengeConfig, PolicyConfig};
use sigil_store::StoreBackend;

/// Full configuration for the `sigil` tool.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigilConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Challenge-response settings.
    #[serde(default)]
    pub challenge: ChallengeConfig,

    /// Issuer keys per attestation type.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which engine to open (sqlite, memory, rocksdb).
    #[serde(default)]
    pub backend: StoreBackend,
    /// Database file (sqlite) or directory (rocksdb).
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/sigil.db")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SigilConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: SigilConfig = toml::from_str(&contents)?;
            config.policy.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
