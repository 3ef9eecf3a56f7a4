use serde::Deserialize;
use std::path::PathBuf;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawEngageConfig {
    #[serde(default)]
    pub store: RawStoreConfig,

    #[serde(default)]
    pub enrichment: RawEnrichmentConfig,

    #[serde(default)]
    pub extension: RawExtensionConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStoreConfig {
    /// Shared store document
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawEnrichmentConfig {
    /// Attach subscription context to "Push Opened"
    pub context_on_opened: Option<bool>,

    /// Subscription type reported in the context block
    pub subscription_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawExtensionConfig {
    /// Extension deadline in milliseconds
    pub deadline_ms: Option<u64>,

    /// File name for downloaded media
    pub media_file_name: Option<String>,
}
