//! Shared key-value store
//!
//! The store is the only channel between the app process and the
//! service-extension process. Both receive a [`KeyValueStore`] and address
//! values through typed [`StoreKey`]s rather than raw strings.

mod file;
mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys understood by the shared store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Persisted subscription status
    Status,
    /// Current badge count
    Count,
    /// Hex-encoded device token
    DeviceToken,
    /// Registered notification categories (JSON document)
    Categories,
    /// One-shot URL for an `open_url` action button
    ActionLink(String),
    /// One-shot deep link for a `deep_link` action button
    ActionDeepLink(String),
    /// One-shot custom action name for a custom action button
    CustomAction(String),
}

impl StoreKey {
    /// The string key as persisted
    pub fn as_key(&self) -> String {
        match self {
            Self::Status => "Status".to_string(),
            Self::Count => "Count".to_string(),
            Self::DeviceToken => "deviceToken".to_string(),
            Self::Categories => "Categories".to_string(),
            Self::ActionLink(id) => format!("ActionLink-{}", id),
            Self::ActionDeepLink(id) => format!("ActionDeepLink-{}", id),
            Self::CustomAction(id) => format!("CustomAction-{}", id),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// A stored value: the store only holds strings and integers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Integer(i64),
    Text(String),
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Read-modify-write closure passed to [`KeyValueStore::update`]
pub type UpdateFn<'a> = &'a (dyn Fn(Option<StoreValue>) -> Option<StoreValue> + Send + Sync);

/// Key-value store shared between processes
///
/// Implementations must apply each call atomically with respect to every
/// other call on the same underlying storage, including calls made from a
/// different process. `update` is the only read-modify-write primitive.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &StoreKey) -> Result<Option<StoreValue>, StoreError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &StoreKey, value: StoreValue) -> Result<(), StoreError>;

    /// Remove a value, returning what was stored
    async fn remove(&self, key: &StoreKey) -> Result<Option<StoreValue>, StoreError>;

    /// Atomically replace a value with `f(current)`; `None` removes it.
    ///
    /// Returns the new value.
    async fn update(
        &self,
        key: &StoreKey,
        f: UpdateFn<'_>,
    ) -> Result<Option<StoreValue>, StoreError>;

    /// Read a string value
    async fn get_string(&self, key: &StoreKey) -> Result<Option<String>, StoreError> {
        match self.get(key).await? {
            None => Ok(None),
            Some(StoreValue::Text(s)) => Ok(Some(s)),
            Some(StoreValue::Integer(_)) => Err(StoreError::WrongType {
                key: key.as_key(),
                expected: "a string",
            }),
        }
    }

    /// Read an integer value
    async fn get_int(&self, key: &StoreKey) -> Result<Option<i64>, StoreError> {
        match self.get(key).await? {
            None => Ok(None),
            Some(StoreValue::Integer(n)) => Ok(Some(n)),
            Some(StoreValue::Text(_)) => Err(StoreError::WrongType {
                key: key.as_key(),
                expected: "an integer",
            }),
        }
    }

    /// Remove a string value and return it, so it can be consumed only once
    async fn take_string(&self, key: &StoreKey) -> Result<Option<String>, StoreError> {
        match self.remove(key).await? {
            Some(StoreValue::Text(s)) => Ok(Some(s)),
            _ => Ok(None),
        }
    }
}
