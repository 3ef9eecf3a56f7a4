use super::types::{RawEngageConfig, RawEnrichmentConfig, RawExtensionConfig, RawStoreConfig};
use anyhow::Result;
use engage_core::EngageConfig;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<EngageConfig> {
        let mut raw = RawEngageConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if user_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Load a single file as the only layer
    pub fn load_from_path(path: &Path) -> Result<EngageConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(EngageConfig::default())
        }
    }

    /// Get user config path (`$XDG_CONFIG_HOME/engage/config.toml`)
    pub fn user_config_path() -> PathBuf {
        engage_paths::config_file()
    }

    /// Get project config path
    /// Can be overridden with ENGAGE_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("ENGAGE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".engage/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawEngageConfig> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawEngageConfig, overlay: RawEngageConfig) -> RawEngageConfig {
        RawEngageConfig {
            store: RawStoreConfig {
                path: overlay.store.path.or(base.store.path),
            },
            enrichment: RawEnrichmentConfig {
                context_on_opened: overlay
                    .enrichment
                    .context_on_opened
                    .or(base.enrichment.context_on_opened),
                subscription_type: overlay
                    .enrichment
                    .subscription_type
                    .or(base.enrichment.subscription_type),
            },
            extension: RawExtensionConfig {
                deadline_ms: overlay.extension.deadline_ms.or(base.extension.deadline_ms),
                media_file_name: overlay
                    .extension
                    .media_file_name
                    .or(base.extension.media_file_name),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawEngageConfig) -> EngageConfig {
        let mut config = EngageConfig::default();
        config.store.path = raw.store.path;
        if let Some(context_on_opened) = raw.enrichment.context_on_opened {
            config.enrichment.context_on_opened = context_on_opened;
        }
        if let Some(subscription_type) = raw.enrichment.subscription_type {
            config.enrichment.subscription_type = subscription_type;
        }
        if let Some(deadline_ms) = raw.extension.deadline_ms {
            config.extension.deadline_ms = deadline_ms;
        }
        if let Some(media_file_name) = raw.extension.media_file_name {
            config.extension.media_file_name = media_file_name;
        }
        config
    }
}
