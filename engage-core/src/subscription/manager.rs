//! SubscriptionManager: owns the persisted subscription status
//!
//! Status and device token live in the shared store so the service
//! extension sees the same values. Every store failure degrades to the
//! default status instead of surfacing an error.

use std::sync::{Arc, OnceLock};

use serde_json::json;
use tracing::{debug, info, warn};

use super::status::{DeviceToken, PermissionState, StatusTransition, SubscriptionStatus};
use crate::analytics::{Analytics, Properties, PushEvent};
use crate::host::{PermissionProvider, PushHost};
use crate::store::{KeyValueStore, StoreKey, StoreValue};

/// Callback invoked with `(previous, current)` whenever the status changes
pub type StatusCallback = Arc<dyn Fn(SubscriptionStatus, SubscriptionStatus) + Send + Sync>;

/// Reason reported when registration fails without one
const UNKNOWN_REASON: &str = "unknown";

/// Tracks and persists the push subscription status
pub struct SubscriptionManager {
    store: Arc<dyn KeyValueStore>,
    analytics: Arc<Analytics>,
    host: Arc<dyn PushHost>,
    permissions: Arc<dyn PermissionProvider>,
    on_change: Option<StatusCallback>,
}

impl SubscriptionManager {
    /// Create a new SubscriptionManager
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        analytics: Arc<Analytics>,
        host: Arc<dyn PushHost>,
        permissions: Arc<dyn PermissionProvider>,
    ) -> Self {
        Self {
            store,
            analytics,
            host,
            permissions,
            on_change: None,
        }
    }

    /// Register the status change callback.
    ///
    /// The callback runs on the caller's task; a panic inside it is not
    /// caught.
    pub fn with_status_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(SubscriptionStatus, SubscriptionStatus) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Current persisted status
    pub async fn status(&self) -> SubscriptionStatus {
        load_status(self.store.as_ref()).await
    }

    /// Persist a status and notify the callback if it changed
    pub async fn set_status(&self, status: SubscriptionStatus) -> Option<StatusTransition> {
        let previous = OnceLock::new();
        let write = |current: Option<StoreValue>| {
            let _ = previous.set(current);
            Some(StoreValue::from(status.as_str()))
        };

        if let Err(e) = self.store.update(&StoreKey::Status, &write).await {
            warn!("Failed to persist subscription status {}: {}", status, e);
            return None;
        }

        let from = match previous.into_inner().flatten() {
            Some(StoreValue::Text(raw)) => raw.parse().unwrap_or_default(),
            _ => SubscriptionStatus::default(),
        };
        if from == status {
            return None;
        }

        info!(from = %from, to = %status, "Push subscription status changed");
        if let Some(callback) = &self.on_change {
            callback(from, status);
        }
        Some(StatusTransition { from, to: status })
    }

    /// Move the status to match the platform permission state.
    ///
    /// Emits "Push Subscription Change" only when the status actually
    /// changes, so calling this repeatedly with the same state is a no-op.
    pub async fn reconcile(&self, permission: PermissionState) -> Option<StatusTransition> {
        let current = self.status().await;
        let target = current.target_for(permission);
        if target == current {
            debug!(status = %current, ?permission, "Subscription status unchanged");
            return None;
        }

        let transition = self.set_status(target).await?;

        // Newly enabled in settings: we need a device token
        if target == SubscriptionStatus::Subscribed {
            self.host.register_for_remote_notifications();
        }

        self.analytics
            .track_push(PushEvent::SubscriptionChanged, Properties::new())
            .await;
        Some(transition)
    }

    /// Query the platform permission state and reconcile against it
    pub async fn refresh(&self) -> Option<StatusTransition> {
        let permission = self.permissions.authorization_status().await;
        self.reconcile(permission).await
    }

    /// Registration succeeded
    pub async fn on_registered(&self, token: DeviceToken) {
        if let Err(e) = self
            .store
            .set(&StoreKey::DeviceToken, token.as_str().into())
            .await
        {
            warn!("Failed to persist device token: {}", e);
        }
        self.set_status(SubscriptionStatus::Subscribed).await;

        info!(token = %token, "Registered for push notifications");
        let mut properties = Properties::new();
        properties.insert("token".into(), json!(token.as_str()));
        self.analytics
            .track_push(PushEvent::Registered, properties)
            .await;
    }

    /// Registration failed
    pub async fn on_registration_failed(&self, reason: Option<&str>) {
        self.clear_token().await;
        self.set_status(SubscriptionStatus::DidNotSubscribe).await;

        let reason = reason.unwrap_or(UNKNOWN_REASON);
        warn!(reason, "Unable to register for push notifications");
        let mut properties = Properties::new();
        properties.insert("error".into(), json!(reason));
        self.analytics
            .track_push(PushEvent::RegistrationFailed, properties)
            .await;
    }

    /// User declined the permission prompt
    pub async fn on_declined(&self) {
        self.clear_token().await;
        self.set_status(SubscriptionStatus::DidNotSubscribe).await;

        info!("Push notifications were declined");
        self.analytics
            .track_push(PushEvent::Declined, Properties::new())
            .await;
    }

    /// Stored device token, if registered
    pub async fn device_token(&self) -> Option<DeviceToken> {
        load_device_token(self.store.as_ref()).await
    }

    async fn clear_token(&self) {
        if let Err(e) = self.store.remove(&StoreKey::DeviceToken).await {
            warn!("Failed to clear device token: {}", e);
        }
    }
}

/// Read the persisted status, falling back to the default on any failure
pub(crate) async fn load_status(store: &dyn KeyValueStore) -> SubscriptionStatus {
    match store.get_string(&StoreKey::Status).await {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
            warn!("Ignoring persisted status: {}", e);
            SubscriptionStatus::default()
        }),
        Ok(None) => SubscriptionStatus::default(),
        Err(e) => {
            warn!("Failed to read subscription status: {}", e);
            SubscriptionStatus::default()
        }
    }
}

/// Read the persisted device token
pub(crate) async fn load_device_token(store: &dyn KeyValueStore) -> Option<DeviceToken> {
    match store.get_string(&StoreKey::DeviceToken).await {
        Ok(token) => token.map(DeviceToken::new),
        Err(e) => {
            warn!("Failed to read device token: {}", e);
            None
        }
    }
}
