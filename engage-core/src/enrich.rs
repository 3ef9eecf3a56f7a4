//! Push event enrichment
//!
//! [`EventEnricher`] sits between `track()` and dispatch. It only touches
//! track events whose name is a recognized push event:
//!
//! - "Push Opened" and "Push Delivered" get `dedup_id` and `event_id`
//!   properties so downstream analytics can collapse re-deliveries.
//! - Subscription-affecting events get a `messaging_subscriptions` context
//!   entry describing this device's subscription.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::analytics::{EventPlugin, PushEvent, RawEvent, TrackEvent};
use crate::store::KeyValueStore;
use crate::subscription::{load_device_token, load_status};

/// Context key holding the subscription block
pub const CONTEXT_KEY: &str = "messaging_subscriptions";

/// Default subscription type reported in the context block
pub const SUBSCRIPTION_TYPE: &str = "IOS_PUSH";

/// Property carrying the notification's message id
pub const MESSAGE_ID_PROPERTY: &str = "message_id";

/// Which events receive the subscription context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentPolicy {
    /// Attach context to "Push Opened" as well
    #[serde(default)]
    pub context_on_opened: bool,

    /// Value of the `type` field in the context block
    #[serde(default = "default_subscription_type")]
    pub subscription_type: String,
}

fn default_subscription_type() -> String {
    SUBSCRIPTION_TYPE.to_string()
}

impl Default for EnrichmentPolicy {
    fn default() -> Self {
        Self {
            context_on_opened: false,
            subscription_type: default_subscription_type(),
        }
    }
}

impl EnrichmentPolicy {
    /// Whether `event` should carry the subscription context
    pub fn attaches_context(&self, event: PushEvent) -> bool {
        event != PushEvent::Opened || self.context_on_opened
    }
}

/// Lowercase the event name and replace spaces with underscores
pub fn normalize_event_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Dedup key for a notification event: message id followed by the
/// normalized event name.
///
/// Spaces in the name become `_` rather than being stripped, so
/// `dedup_key("m-7", "Push Delivered")` is `"m-7push_delivered"`.
pub fn dedup_key(message_id: &str, event_name: &str) -> String {
    format!("{}{}", message_id, normalize_event_name(event_name))
}

/// EventPlugin that enriches push lifecycle events
pub struct EventEnricher {
    store: Arc<dyn KeyValueStore>,
    policy: EnrichmentPolicy,
}

impl EventEnricher {
    pub fn new(store: Arc<dyn KeyValueStore>, policy: EnrichmentPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &EnrichmentPolicy {
        &self.policy
    }

    /// Enrich an event; anything that is not a recognized push track event
    /// is returned unchanged
    pub async fn enrich(&self, event: RawEvent) -> RawEvent {
        let mut track = match event {
            RawEvent::Track(track) => track,
            other => return other,
        };
        let Some(push_event) = PushEvent::from_name(&track.event) else {
            return RawEvent::Track(track);
        };

        if push_event.is_notification_event() {
            add_dedup_ids(&mut track);
        }

        if self.policy.attaches_context(push_event) {
            let subscription = self.subscription_context().await;
            track
                .context
                .insert(CONTEXT_KEY.to_string(), Value::Array(vec![subscription]));
        }

        debug!(event = %track.event, "Enriched push event");
        RawEvent::Track(track)
    }

    async fn subscription_context(&self) -> Value {
        let token = load_device_token(self.store.as_ref()).await;
        let status = load_status(self.store.as_ref()).await;
        json!({
            "key": token.as_ref().map(|t| t.as_str()),
            "type": self.policy.subscription_type,
            "status": status.as_str(),
        })
    }
}

fn add_dedup_ids(track: &mut TrackEvent) {
    let message_id = track
        .properties
        .get(MESSAGE_ID_PROPERTY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let dedup_id = dedup_key(&message_id, &track.event);
    track.properties.insert("dedup_id".into(), json!(dedup_id));
    track.properties.insert("event_id".into(), json!(message_id));
}

#[async_trait]
impl EventPlugin for EventEnricher {
    fn name(&self) -> &str {
        "push-enrichment"
    }

    async fn execute(&self, event: RawEvent) -> RawEvent {
        self.enrich(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{IdentifyEvent, Properties};
    use crate::store::{MemoryStore, StoreKey};
    use chrono::Utc;

    fn track(name: &str, properties: Value) -> RawEvent {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Properties::new(),
        };
        RawEvent::Track(TrackEvent::new(name, properties))
    }

    fn enricher(store: Arc<MemoryStore>) -> EventEnricher {
        EventEnricher::new(store, EnrichmentPolicy::default())
    }

    #[test]
    fn dedup_key_is_deterministic() {
        assert_eq!(dedup_key("m-1", "Push Opened"), "m-1push_opened");
        assert_eq!(
            dedup_key("m-1", "Push Opened"),
            dedup_key("m-1", "Push Opened")
        );
        assert_ne!(
            dedup_key("m-1", "Push Opened"),
            dedup_key("m-2", "Push Opened")
        );
        assert_ne!(
            dedup_key("m-1", "Push Opened"),
            dedup_key("m-1", "Push Delivered")
        );
    }

    #[test]
    fn default_policy_skips_opened_only() {
        let policy = EnrichmentPolicy::default();
        for event in PushEvent::ALL {
            assert_eq!(policy.attaches_context(event), event != PushEvent::Opened);
        }

        let everything = EnrichmentPolicy {
            context_on_opened: true,
            ..Default::default()
        };
        assert!(PushEvent::ALL.into_iter().all(|e| everything.attaches_context(e)));
    }

    #[tokio::test]
    async fn non_push_events_pass_through() {
        let enricher = enricher(Arc::new(MemoryStore::new()));
        let event = track("Order Completed", json!({"total": 3}));
        assert_eq!(enricher.enrich(event.clone()).await, event);

        let identify = RawEvent::Identify(IdentifyEvent {
            user_id: "u-1".into(),
            traits: Properties::new(),
            timestamp: Utc::now(),
        });
        assert_eq!(enricher.enrich(identify.clone()).await, identify);
    }

    #[tokio::test]
    async fn opened_gets_dedup_ids_but_no_context() {
        let enricher = enricher(Arc::new(MemoryStore::new()));
        let event = enricher
            .enrich(track("Push Opened", json!({"message_id": "m-42"})))
            .await;
        let track = event.as_track().unwrap();

        assert_eq!(track.properties["dedup_id"], json!("m-42push_opened"));
        assert_eq!(track.properties["event_id"], json!("m-42"));
        assert!(!track.context.contains_key(CONTEXT_KEY));
    }

    #[tokio::test]
    async fn missing_message_id_gets_a_fresh_one() {
        let enricher = enricher(Arc::new(MemoryStore::new()));
        let event = enricher.enrich(track("Push Delivered", json!({}))).await;
        let track = event.as_track().unwrap();

        let event_id = track.properties["event_id"].as_str().unwrap();
        assert!(Uuid::parse_str(event_id).is_ok());
        assert_eq!(
            track.properties["dedup_id"],
            json!(format!("{}push_delivered", event_id))
        );
    }

    #[tokio::test]
    async fn delivered_gets_dedup_ids_and_context() {
        let store = Arc::new(MemoryStore::new());
        store.set(&StoreKey::DeviceToken, "ab12".into()).await.unwrap();
        store.set(&StoreKey::Status, "SUBSCRIBED".into()).await.unwrap();

        let event = enricher(store)
            .enrich(track("Push Delivered", json!({"message_id": "m-1"})))
            .await;
        let track = event.as_track().unwrap();

        assert_eq!(track.properties["dedup_id"], json!("m-1push_delivered"));
        assert_eq!(
            track.context[CONTEXT_KEY],
            json!([{"key": "ab12", "type": "IOS_PUSH", "status": "SUBSCRIBED"}])
        );
    }

    #[tokio::test]
    async fn lifecycle_events_get_context_with_null_token() {
        let enricher = enricher(Arc::new(MemoryStore::new()));
        let event = enricher
            .enrich(track("Push Subscription Change", json!({})))
            .await;
        let track = event.as_track().unwrap();

        assert_eq!(
            track.context[CONTEXT_KEY],
            json!([{"key": null, "type": "IOS_PUSH", "status": "DID_NOT_SUBSCRIBE"}])
        );
        assert!(!track.properties.contains_key("dedup_id"));
    }

    #[tokio::test]
    async fn custom_subscription_type_is_reported() {
        let policy = EnrichmentPolicy {
            context_on_opened: true,
            subscription_type: "ANDROID_PUSH".into(),
        };
        let enricher = EventEnricher::new(Arc::new(MemoryStore::new()), policy);
        let event = enricher.enrich(track("Push Opened", json!({}))).await;

        assert_eq!(
            event.as_track().unwrap().context[CONTEXT_KEY][0]["type"],
            json!("ANDROID_PUSH")
        );
    }
}
