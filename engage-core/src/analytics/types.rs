//! Analytics event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered string → value mapping used for properties and context
pub type Properties = Map<String, Value>;

/// Push lifecycle events emitted by engage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushEvent {
    /// User opened a notification
    Opened,
    /// Notification arrived on the device
    Delivered,
    /// Device registered for remote notifications
    Registered,
    /// Registration with the push service failed
    RegistrationFailed,
    /// Subscription status changed
    SubscriptionChanged,
    /// User declined the permission prompt
    Declined,
    /// An action button was pressed
    ActionPressed,
    /// An action button was dismissed
    ActionDeclined,
}

impl PushEvent {
    pub const ALL: [PushEvent; 8] = [
        Self::Opened,
        Self::Delivered,
        Self::Registered,
        Self::RegistrationFailed,
        Self::SubscriptionChanged,
        Self::Declined,
        Self::ActionPressed,
        Self::ActionDeclined,
    ];

    /// Event name as sent through the pipeline
    pub fn name(&self) -> &'static str {
        match self {
            Self::Opened => "Push Opened",
            Self::Delivered => "Push Delivered",
            Self::Registered => "Registered for Push",
            Self::RegistrationFailed => "Unable to Register for Push",
            Self::SubscriptionChanged => "Push Subscription Change",
            Self::Declined => "Push Subscription Declined",
            Self::ActionPressed => "Action Button Pressed",
            Self::ActionDeclined => "Action Button Declined",
        }
    }

    /// Look up a push event by its pipeline name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }

    /// Whether this is a per-notification event that needs a dedup id
    pub fn is_notification_event(&self) -> bool {
        matches!(self, Self::Opened | Self::Delivered)
    }
}

/// A track call as it flows through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEvent {
    /// Event name
    pub event: String,
    /// Event properties
    #[serde(default)]
    pub properties: Properties,
    /// Event context
    #[serde(default)]
    pub context: Properties,
    /// When the event was created
    pub timestamp: DateTime<Utc>,
}

impl TrackEvent {
    /// Create a track event with empty context
    pub fn new(event: impl Into<String>, properties: Properties) -> Self {
        Self {
            event: event.into(),
            properties,
            context: Properties::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Screen view event; passes through enrichment untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenEvent {
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    pub timestamp: DateTime<Utc>,
}

/// Identify event; passes through enrichment untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyEvent {
    pub user_id: String,
    #[serde(default)]
    pub traits: Properties,
    pub timestamp: DateTime<Utc>,
}

/// Any event handed to the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawEvent {
    Track(TrackEvent),
    Screen(ScreenEvent),
    Identify(IdentifyEvent),
}

impl RawEvent {
    /// The track event, if this is one
    pub fn as_track(&self) -> Option<&TrackEvent> {
        match self {
            Self::Track(track) => Some(track),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_event_names_round_trip() {
        for event in PushEvent::ALL {
            assert_eq!(PushEvent::from_name(event.name()), Some(event));
        }
    }

    #[test]
    fn unknown_names_are_not_push_events() {
        assert_eq!(PushEvent::from_name("Order Completed"), None);
        assert_eq!(PushEvent::from_name("push opened"), None);
    }

    #[test]
    fn only_open_and_delivery_are_notification_events() {
        let notification_events: Vec<_> = PushEvent::ALL
            .into_iter()
            .filter(PushEvent::is_notification_event)
            .collect();
        assert_eq!(
            notification_events,
            vec![PushEvent::Opened, PushEvent::Delivered]
        );
    }

    #[test]
    fn raw_event_serializes_with_type_tag() {
        let event = RawEvent::Track(TrackEvent::new("Push Opened", Properties::new()));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "track");
        assert_eq!(json["event"], "Push Opened");
    }
}
