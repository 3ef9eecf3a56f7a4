//! ActionRouter: turns a tap or button press into an intent
//!
//! Routing is total. Every `(category, action)` pair produces a
//! [`RouteOutcome`]; stale button ids, missing links and invalid URLs all
//! end in [`RouteOutcome::NoOp`] rather than an error.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

use super::action::{ActionIdentifier, ActionKind};
use crate::host::PushHost;
use crate::payload::NotificationPayload;
use crate::store::{KeyValueStore, StoreKey};

/// Capacity of the open signal channel
const SIGNAL_CAPACITY: usize = 64;

/// Key added to open signals for deep links
pub const DEEP_LINK_KEY: &str = "deep_link";

/// Key added to open signals for custom actions
pub const CUSTOM_ACTION_KEY: &str = "custom_action";

/// Navigation request handed to the host
///
/// Holds the synthesized key merged with the notification payload. Payload
/// keys win on conflict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OpenSignal(Map<String, Value>);

impl OpenSignal {
    /// Build `{key: value}` and merge `payload` over it
    pub fn merged(key: &str, value: impl Into<String>, payload: &Map<String, Value>) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), Value::String(value.into()));
        for (k, v) in payload {
            data.insert(k.clone(), v.clone());
        }
        Self(data)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The deep link, if this signal carries one
    pub fn deep_link(&self) -> Option<&str> {
        self.get(DEEP_LINK_KEY).and_then(Value::as_str)
    }

    /// The custom action name, if this signal carries one
    pub fn custom_action(&self) -> Option<&str> {
        self.get(CUSTOM_ACTION_KEY).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Result of routing one notification response
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Nothing to do
    NoOp,
    /// The host was asked to open this URL
    OpenedUrl(Url),
    /// An open signal was emitted
    Open(OpenSignal),
}

/// Routes notification responses to the host
pub struct ActionRouter {
    store: Arc<dyn KeyValueStore>,
    host: Arc<dyn PushHost>,
    tx: broadcast::Sender<OpenSignal>,
}

impl ActionRouter {
    pub fn new(store: Arc<dyn KeyValueStore>, host: Arc<dyn PushHost>) -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { store, host, tx }
    }

    /// Receive every emitted open signal
    pub fn subscribe(&self) -> broadcast::Receiver<OpenSignal> {
        self.tx.subscribe()
    }

    /// Route a response to a notification
    ///
    /// `category` is the notification's category identifier and `action`
    /// the platform's action identifier.
    pub async fn route(
        &self,
        category: &str,
        action: &str,
        payload: &NotificationPayload,
    ) -> RouteOutcome {
        let action = ActionIdentifier::parse(action);
        debug!(category, kind = %action.kind, id = %action.id, "Routing notification response");

        match action.kind {
            ActionKind::DefaultTap => self.route_tap(category, payload),
            ActionKind::OpenApp => RouteOutcome::NoOp,
            ActionKind::DeepLink => match self.take(StoreKey::ActionDeepLink(action.id)).await {
                Some(link) => self.emit(OpenSignal::merged(DEEP_LINK_KEY, link, &payload.raw)),
                None => RouteOutcome::NoOp,
            },
            ActionKind::OpenUrl => match self.take(StoreKey::ActionLink(action.id)).await {
                Some(link) => self.open_url(&link),
                None => RouteOutcome::NoOp,
            },
            ActionKind::Custom(_) => match self.take(StoreKey::CustomAction(action.id)).await {
                Some(name) => {
                    self.emit(OpenSignal::merged(CUSTOM_ACTION_KEY, name, &payload.raw))
                }
                None => RouteOutcome::NoOp,
            },
        }
    }

    /// Body tap: the category decides
    fn route_tap(&self, category: &str, payload: &NotificationPayload) -> RouteOutcome {
        match ActionKind::from_name(category) {
            ActionKind::DeepLink => match &payload.link {
                Some(link) => {
                    self.emit(OpenSignal::merged(DEEP_LINK_KEY, link.as_str(), &payload.raw))
                }
                None => {
                    debug!("deep_link notification without a link");
                    RouteOutcome::NoOp
                }
            },
            ActionKind::OpenUrl => match &payload.link {
                Some(link) => self.open_url(link),
                None => {
                    debug!("open_url notification without a link");
                    RouteOutcome::NoOp
                }
            },
            _ => RouteOutcome::NoOp,
        }
    }

    /// One-shot lookup: the value is removed as it is read
    async fn take(&self, key: StoreKey) -> Option<String> {
        match self.store.take_string(&key).await {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                debug!(%key, "No stored action data");
                None
            }
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn open_url(&self, link: &str) -> RouteOutcome {
        match Url::parse(link) {
            Ok(url) => {
                self.host.open_url(&url);
                RouteOutcome::OpenedUrl(url)
            }
            Err(e) => {
                debug!(link, "Ignoring invalid URL: {}", e);
                RouteOutcome::NoOp
            }
        }
    }

    fn emit(&self, signal: OpenSignal) -> RouteOutcome {
        // No receivers is fine; the outcome still carries the signal
        let _ = self.tx.send(signal.clone());
        RouteOutcome::Open(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use crate::routing::DEFAULT_ACTION_IDENTIFIER;
    use crate::store::{MemoryStore, StoreValue};
    use serde_json::json;

    struct Fixture {
        store: Arc<MemoryStore>,
        host: Arc<RecordingHost>,
        router: ActionRouter,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let host = Arc::new(RecordingHost::new());
        let router = ActionRouter::new(store.clone(), host.clone());
        Fixture {
            store,
            host,
            router,
        }
    }

    fn payload(value: Value) -> NotificationPayload {
        NotificationPayload::from_value(value)
    }

    #[tokio::test]
    async fn default_tap_deep_link_emits_merged_payload() {
        let f = fixture();
        let mut rx = f.router.subscribe();
        let p = payload(json!({"link": "app://settings", "aps": {"category": "deep_link"}}));

        let outcome = f.router.route("deep_link", DEFAULT_ACTION_IDENTIFIER, &p).await;

        let expected = json!({
            "deep_link": "app://settings",
            "link": "app://settings",
            "aps": {"category": "deep_link"}
        });
        let RouteOutcome::Open(signal) = outcome else {
            panic!("expected an open signal");
        };
        assert_eq!(serde_json::to_value(&signal).unwrap(), expected);
        assert_eq!(rx.recv().await.unwrap(), signal);
    }

    #[tokio::test]
    async fn payload_keys_win_on_merge() {
        let f = fixture();
        let p = payload(json!({"link": "app://a", "deep_link": "app://author-set"}));

        let outcome = f.router.route("deep_link", DEFAULT_ACTION_IDENTIFIER, &p).await;

        let RouteOutcome::Open(signal) = outcome else {
            panic!("expected an open signal");
        };
        assert_eq!(signal.deep_link(), Some("app://author-set"));
    }

    #[tokio::test]
    async fn default_tap_open_url_opens_without_signal() {
        let f = fixture();
        let mut rx = f.router.subscribe();
        let p = payload(json!({"link": "https://example.com/sale"}));

        let outcome = f.router.route("open_url", DEFAULT_ACTION_IDENTIFIER, &p).await;

        let url = Url::parse("https://example.com/sale").unwrap();
        assert_eq!(outcome, RouteOutcome::OpenedUrl(url.clone()));
        assert_eq!(f.host.opened(), vec![url]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn default_tap_with_bad_or_missing_link_is_noop() {
        let f = fixture();
        let bad = payload(json!({"link": "not a url"}));
        let none = payload(json!({}));

        assert_eq!(
            f.router.route("open_url", DEFAULT_ACTION_IDENTIFIER, &bad).await,
            RouteOutcome::NoOp
        );
        assert_eq!(
            f.router.route("open_url", DEFAULT_ACTION_IDENTIFIER, &none).await,
            RouteOutcome::NoOp
        );
        assert_eq!(
            f.router.route("deep_link", DEFAULT_ACTION_IDENTIFIER, &none).await,
            RouteOutcome::NoOp
        );
        assert!(f.host.opened().is_empty());
    }

    #[tokio::test]
    async fn default_tap_open_app_and_unknown_category_are_noop() {
        let f = fixture();
        let p = payload(json!({"link": "app://x"}));
        for category in ["open_app", "promo", ""] {
            assert_eq!(
                f.router.route(category, DEFAULT_ACTION_IDENTIFIER, &p).await,
                RouteOutcome::NoOp
            );
        }
    }

    #[tokio::test]
    async fn deep_link_button_is_consumed_once() {
        let f = fixture();
        f.store
            .set(&StoreKey::ActionDeepLink("b-1".into()), "app://offers".into())
            .await
            .unwrap();
        let p = payload(json!({"campaign": "spring"}));

        let first = f.router.route("anything", "deep_link-b-1", &p).await;
        let RouteOutcome::Open(signal) = first else {
            panic!("expected an open signal");
        };
        assert_eq!(signal.deep_link(), Some("app://offers"));
        assert_eq!(signal.get("campaign"), Some(&json!("spring")));

        let second = f.router.route("anything", "deep_link-b-1", &p).await;
        assert_eq!(second, RouteOutcome::NoOp);
    }

    #[tokio::test]
    async fn open_url_button_opens_and_removes_link() {
        let f = fixture();
        let key = StoreKey::ActionLink("b-2".into());
        f.store
            .set(&key, "https://example.com/read".into())
            .await
            .unwrap();

        let outcome = f.router.route("c", "open_url-b-2", &payload(json!({}))).await;

        assert!(matches!(
            outcome,
            RouteOutcome::OpenedUrl(ref u) if u.as_str() == "https://example.com/read"
        ));
        assert_eq!(f.store.get(&key).await.unwrap(), None);
        assert_eq!(
            f.router.route("c", "open_url-b-2", &payload(json!({}))).await,
            RouteOutcome::NoOp
        );
        assert_eq!(f.host.opened().len(), 1);
    }

    #[tokio::test]
    async fn custom_button_emits_custom_action() {
        let f = fixture();
        f.store
            .set(&StoreKey::CustomAction("b-3".into()), "accept".into())
            .await
            .unwrap();

        let outcome = f.router.route("c", "accept-b-3", &payload(json!({}))).await;

        let RouteOutcome::Open(signal) = outcome else {
            panic!("expected an open signal");
        };
        assert_eq!(signal.custom_action(), Some("accept"));
        assert_eq!(f.store.len().await, 0);
    }

    #[tokio::test]
    async fn open_app_button_and_stale_ids_are_noop() {
        let f = fixture();
        let p = payload(json!({"link": "app://x"}));
        let actions = ["open_app", "open_app-1", "deep_link-gone", "open_url-gone", "accept-gone"];
        for action in actions {
            assert_eq!(f.router.route("deep_link", action, &p).await, RouteOutcome::NoOp);
        }
        assert!(f.host.opened().is_empty());
    }

    #[tokio::test]
    async fn routing_is_total() {
        let f = fixture();
        let payloads = [
            payload(json!({})),
            payload(json!({"link": "app://x"})),
            payload(json!({"link": "https://example.com"})),
            payload(json!({"link": 5})),
        ];
        let categories = ["open_app", "deep_link", "open_url", "custom", ""];
        let actions = [
            DEFAULT_ACTION_IDENTIFIER,
            "open_app",
            "deep_link",
            "deep_link-",
            "open_url-x",
            "custom-y",
            "-",
            "",
        ];

        for p in &payloads {
            for category in categories {
                for action in actions {
                    // Must return without panicking for every combination
                    let _ = f.router.route(category, action, p).await;
                }
            }
        }
    }

    #[tokio::test]
    async fn wrong_typed_stored_value_is_noop() {
        let f = fixture();
        f.store
            .set(&StoreKey::ActionLink("n".into()), StoreValue::Integer(7))
            .await
            .unwrap();
        assert_eq!(
            f.router.route("c", "open_url-n", &payload(json!({}))).await,
            RouteOutcome::NoOp
        );
    }
}
