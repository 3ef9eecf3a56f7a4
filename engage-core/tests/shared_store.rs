//! FileStore shared by independent handles
//!
//! Each handle stands in for a separate process: they share nothing but the
//! document path, so every update must go through the file lock.

use std::sync::Arc;

use tempfile::TempDir;

use engage_core::extension::apply_badge;
use engage_core::{BadgeStrategy, FileStore, KeyValueStore, StoreKey, StoreValue};

#[tokio::test]
async fn concurrent_increments_from_separate_handles_are_not_lost() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::new(FileStore::new(&path));
        handles.push(tokio::spawn(async move {
            apply_badge(store.as_ref(), BadgeStrategy::Increment, 1)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let reader = FileStore::new(&path);
    assert_eq!(
        reader.get(&StoreKey::Count).await.unwrap(),
        Some(StoreValue::Integer(16))
    );
}

#[tokio::test]
async fn one_shot_value_is_taken_by_exactly_one_handle() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");
    let key = StoreKey::ActionLink("button".to_string());

    FileStore::new(&path)
        .set(&key, "https://example.com".into())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = FileStore::new(&path);
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            store.take_string(&key).await.unwrap()
        }));
    }

    let mut taken = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            taken += 1;
        }
    }
    assert_eq!(taken, 1);
}

#[tokio::test]
async fn values_survive_reopening() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("store.json");

    {
        let store = FileStore::new(&path);
        store
            .set(&StoreKey::Status, "SUBSCRIBED".into())
            .await
            .unwrap();
        store
            .set(&StoreKey::DeviceToken, "ab12".into())
            .await
            .unwrap();
    }

    let store = FileStore::new(&path);
    assert_eq!(
        store.get_string(&StoreKey::Status).await.unwrap().as_deref(),
        Some("SUBSCRIBED")
    );
    assert_eq!(
        store
            .get_string(&StoreKey::DeviceToken)
            .await
            .unwrap()
            .as_deref(),
        Some("ab12")
    );
}
