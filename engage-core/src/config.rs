//! Configuration for engage

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::enrich::EnrichmentPolicy;
use crate::error::ConfigError;
use crate::extension::DEFAULT_MEDIA_FILE_NAME;

/// Default extension deadline (the platform allows roughly 30 seconds)
pub const DEFAULT_DEADLINE_MS: u64 = 25_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngageConfig {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub enrichment: EnrichmentPolicy,

    #[serde(default)]
    pub extension: ExtensionSection,
}

/// Shared store location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSection {
    /// Path of the store document; the CLI falls back to its data dir
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Service extension settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSection {
    /// Time budget for one notification, in milliseconds
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// File name given to downloaded media
    #[serde(default = "default_media_file_name")]
    pub media_file_name: String,
}

fn default_deadline_ms() -> u64 {
    DEFAULT_DEADLINE_MS
}

fn default_media_file_name() -> String {
    DEFAULT_MEDIA_FILE_NAME.to_string()
}

impl Default for ExtensionSection {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            media_file_name: default_media_file_name(),
        }
    }
}

impl ExtensionSection {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl EngageConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
