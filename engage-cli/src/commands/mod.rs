//! CLI subcommands
//!
//! Each invocation plays one lifecycle callback against the shared store,
//! the way the app or its extension would when woken by the platform.

pub mod events;
pub mod extension;
pub mod route;
pub mod subscription;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use serde_json::{Map, Value};
use tracing::debug;

use engage_core::subscription::PermissionState;
use engage_core::{Engage, EngageConfig, FileStore, FixedPermission};

use crate::output::{CliHost, JsonLinesSink};

/// Shared state for a single command run
pub struct Context {
    pub config: EngageConfig,
    pub store: Arc<FileStore>,
}

impl Context {
    /// Open the store at `store_override`, the configured path, or the default
    pub fn new(config: EngageConfig, store_override: Option<PathBuf>) -> Self {
        let path = resolve_store_path(store_override, &config);
        debug!(path = %path.display(), "Using shared store");
        Self {
            store: Arc::new(FileStore::new(path)),
            config,
        }
    }

    /// App-side instance reporting events and host requests as JSON lines
    pub fn engage(&self, permission: PermissionState) -> Engage {
        Engage::from_config(
            &self.config,
            self.store.clone(),
            Arc::new(JsonLinesSink),
            Arc::new(CliHost),
            Arc::new(FixedPermission(permission)),
        )
    }
}

fn resolve_store_path(store_override: Option<PathBuf>, config: &EngageConfig) -> PathBuf {
    store_override
        .or_else(|| config.store.path.clone())
        .unwrap_or_else(engage_paths::store_path)
}

/// Read a JSON object from `path`, or from stdin when `path` is `-`
pub fn read_payload(path: &Path) -> Result<Map<String, Value>> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload from {}", path.display()))?
    };
    parse_object(&contents)
}

/// Parse `contents` as a JSON object
pub fn parse_object(contents: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(contents).context("Payload is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("Payload must be a JSON object, got: {}", other),
    }
}
