//! Badge count persistence

use tracing::debug;

use crate::error::StoreError;
use crate::payload::BadgeStrategy;
use crate::store::{KeyValueStore, StoreKey, StoreValue};

/// Apply `strategy` to the stored count and persist the result.
///
/// A missing or non-integer stored count counts as 0. Returns the new count.
pub async fn apply_badge(
    store: &dyn KeyValueStore,
    strategy: BadgeStrategy,
    amount: i64,
) -> Result<i64, StoreError> {
    let apply = |current: Option<StoreValue>| {
        let current = match current {
            Some(StoreValue::Integer(n)) => n,
            _ => 0,
        };
        Some(StoreValue::Integer(strategy.apply(current, amount)))
    };

    let next = match store.update(&StoreKey::Count, &apply).await? {
        Some(StoreValue::Integer(n)) => n,
        _ => strategy.apply(0, amount),
    };
    debug!(next, ?strategy, amount, "Updated badge count");
    Ok(next)
}

/// Stored badge count, 0 when unset
pub async fn badge_count(store: &dyn KeyValueStore) -> Result<i64, StoreError> {
    Ok(store.get_int(&StoreKey::Count).await?.unwrap_or(0))
}

/// Clear the stored badge count
pub async fn reset_badge(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.set(&StoreKey::Count, StoreValue::Integer(0)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn decrement_from_stored_count() {
        let store = MemoryStore::new();
        store
            .set(&StoreKey::Count, StoreValue::Integer(10))
            .await
            .unwrap();

        let next = apply_badge(&store, BadgeStrategy::Decrement, 4).await.unwrap();

        assert_eq!(next, 6);
        assert_eq!(badge_count(&store).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn missing_count_starts_at_zero() {
        let store = MemoryStore::new();
        assert_eq!(badge_count(&store).await.unwrap(), 0);
        assert_eq!(
            apply_badge(&store, BadgeStrategy::Increment, 1).await.unwrap(),
            1
        );
        assert_eq!(
            apply_badge(&store, BadgeStrategy::Increment, 2).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn garbage_count_is_replaced() {
        let store = MemoryStore::new();
        store.set(&StoreKey::Count, "lots".into()).await.unwrap();

        let next = apply_badge(&store, BadgeStrategy::Unspecified, 5).await.unwrap();

        assert_eq!(next, 5);
        assert_eq!(
            store.get(&StoreKey::Count).await.unwrap(),
            Some(StoreValue::Integer(5))
        );
    }

    #[tokio::test]
    async fn reset_sets_zero() {
        let store = MemoryStore::new();
        apply_badge(&store, BadgeStrategy::Set, 9).await.unwrap();
        reset_badge(&store).await.unwrap();
        assert_eq!(badge_count(&store).await.unwrap(), 0);
    }
}
