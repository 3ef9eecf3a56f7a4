//! In-memory store for tests and single-process hosts

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreKey, StoreValue, UpdateFn};
use crate::error::StoreError;

/// In-memory implementation of KeyValueStore
///
/// Values live in a HashMap behind an RwLock; `update` holds the write
/// lock for the whole read-modify-write.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, StoreValue>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<StoreValue>, StoreError> {
        Ok(self.values.read().await.get(&key.as_key()).cloned())
    }

    async fn set(&self, key: &StoreKey, value: StoreValue) -> Result<(), StoreError> {
        self.values.write().await.insert(key.as_key(), value);
        Ok(())
    }

    async fn remove(&self, key: &StoreKey) -> Result<Option<StoreValue>, StoreError> {
        Ok(self.values.write().await.remove(&key.as_key()))
    }

    async fn update(
        &self,
        key: &StoreKey,
        f: UpdateFn<'_>,
    ) -> Result<Option<StoreValue>, StoreError> {
        let mut values = self.values.write().await;
        let name = key.as_key();
        let next = f(values.get(&name).cloned());
        match &next {
            Some(value) => {
                values.insert(name, value.clone());
            }
            None => {
                values.remove(&name);
            }
        }
        Ok(next)
    }
}
