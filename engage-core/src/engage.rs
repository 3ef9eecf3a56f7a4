//! Engage: app-side entry point tying the components together
//!
//! The host forwards application and notification lifecycle callbacks here.
//! Subscription changes go to the [`SubscriptionManager`], notification
//! taps to the [`ActionRouter`], and every push event passes through the
//! [`EventEnricher`] on its way to the sink.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::analytics::{Analytics, EventSink, Properties, PushEvent};
use crate::config::EngageConfig;
use crate::enrich::{EnrichmentPolicy, EventEnricher};
use crate::extension::reset_badge;
use crate::host::{PermissionProvider, PushHost};
use crate::payload::NotificationPayload;
use crate::routing::{ActionRouter, OpenSignal, RouteOutcome};
use crate::store::KeyValueStore;
use crate::subscription::{
    DeviceToken, StatusTransition, SubscriptionManager, SubscriptionStatus,
};

/// App-side engage instance
pub struct Engage {
    store: Arc<dyn KeyValueStore>,
    analytics: Arc<Analytics>,
    subscriptions: SubscriptionManager,
    router: ActionRouter,
}

impl Engage {
    /// Wire up an instance. The enricher is installed as the first plugin.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn EventSink>,
        host: Arc<dyn PushHost>,
        permissions: Arc<dyn PermissionProvider>,
        policy: EnrichmentPolicy,
    ) -> Self {
        let enricher = Arc::new(EventEnricher::new(store.clone(), policy));
        let analytics = Arc::new(Analytics::new(sink).with_plugin(enricher));
        let subscriptions =
            SubscriptionManager::new(store.clone(), analytics.clone(), host.clone(), permissions);
        let router = ActionRouter::new(store.clone(), host);

        Self {
            store,
            analytics,
            subscriptions,
            router,
        }
    }

    /// Wire up an instance using the enrichment settings from `config`
    pub fn from_config(
        config: &EngageConfig,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn EventSink>,
        host: Arc<dyn PushHost>,
        permissions: Arc<dyn PermissionProvider>,
    ) -> Self {
        Self::new(store, sink, host, permissions, config.enrichment.clone())
    }

    /// Register the status change callback
    pub fn with_status_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(SubscriptionStatus, SubscriptionStatus) + Send + Sync + 'static,
    {
        self.subscriptions = self.subscriptions.with_status_callback(callback);
        self
    }

    pub fn analytics(&self) -> &Arc<Analytics> {
        &self.analytics
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub fn router(&self) -> &ActionRouter {
        &self.router
    }

    /// Receive open signals emitted by the router
    pub fn subscribe_opens(&self) -> broadcast::Receiver<OpenSignal> {
        self.router.subscribe()
    }

    /// Current subscription status
    pub async fn status(&self) -> SubscriptionStatus {
        self.subscriptions.status().await
    }

    /// Check the subscription status once at startup
    pub async fn configure(&self) -> Option<StatusTransition> {
        self.subscriptions.refresh().await
    }

    /// The user may have changed notification settings while away
    pub async fn application_will_enter_foreground(&self) -> Option<StatusTransition> {
        self.subscriptions.refresh().await
    }

    /// The app was launched, possibly by tapping a notification
    pub async fn did_finish_launching(&self, notification: Option<&Map<String, Value>>) {
        if let Some(payload) = notification {
            self.track_delivered(payload).await;
        }
    }

    /// A notification arrived while the app was running
    pub async fn received_remote_notification(&self, payload: &Map<String, Value>) {
        self.track_delivered(payload).await;
    }

    pub async fn registered_for_remote_notifications(&self, token: DeviceToken) {
        self.subscriptions.on_registered(token).await;
    }

    pub async fn failed_to_register_for_remote_notifications(&self, reason: Option<&str>) {
        self.subscriptions.on_registration_failed(reason).await;
    }

    pub async fn declined_remote_notifications(&self) {
        self.subscriptions.on_declined().await;
    }

    /// The user tapped the notification or one of its buttons
    pub async fn handle_notification_response(
        &self,
        category: &str,
        action: &str,
        payload: &Map<String, Value>,
    ) -> RouteOutcome {
        self.analytics
            .track_push(PushEvent::Opened, payload.clone())
            .await;

        let payload = NotificationPayload::decode(payload.clone());
        self.router.route(category, action, &payload).await
    }

    /// Clear the stored badge count
    pub async fn reset_badge(&self) {
        match reset_badge(self.store.as_ref()).await {
            Ok(()) => debug!("Badge count reset"),
            Err(e) => warn!("Failed to reset badge count: {}", e),
        }
    }

    /// Track an arbitrary event through the enrichment pipeline
    pub async fn track(&self, name: &str, properties: Properties) {
        self.analytics.track(name, properties).await;
    }

    async fn track_delivered(&self, payload: &Map<String, Value>) {
        self.analytics
            .track_push(PushEvent::Delivered, payload.clone())
            .await;
    }
}
