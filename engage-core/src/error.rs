//! Error types for engage-core

use thiserror::Error;

/// Top-level error type for engage-core
#[derive(Error, Debug)]
pub enum EngageError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the shared key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store document is corrupt: {0}")]
    Corrupt(String),

    #[error("Value for {key} is not {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("Store task failed: {0}")]
    Task(String),
}

/// Errors while fetching a media attachment
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Failed to write attachment: {0}")]
    Write(#[source] std::io::Error),
}

/// Errors while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
