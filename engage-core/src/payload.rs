//! Inbound notification payload
//!
//! The platform hands us an untyped JSON mapping. [`NotificationPayload::decode`]
//! pulls out the keys engage understands and keeps the original mapping in
//! `raw` so it can be forwarded to the host verbatim. Every field has a
//! fallback; a malformed field is treated as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Badge amount used when the payload does not carry one
pub const DEFAULT_BADGE_AMOUNT: i64 = 1;

/// How a new badge amount combines with the stored count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStrategy {
    Increment,
    Decrement,
    Set,
    #[default]
    Unspecified,
}

impl BadgeStrategy {
    /// Parse the wire value (`inc`, `dec`, `set`); anything else is unspecified
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("inc") => Self::Increment,
            Some("dec") => Self::Decrement,
            Some("set") => Self::Set,
            _ => Self::Unspecified,
        }
    }

    /// New badge count; unspecified behaves like set
    pub fn apply(self, current: i64, amount: i64) -> i64 {
        match self {
            Self::Increment => current.saturating_add(amount),
            Self::Decrement => current.saturating_sub(amount),
            Self::Set | Self::Unspecified => amount,
        }
    }
}

/// A dynamic action button described by the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapActionButton {
    /// Action kind (`open_app`, `deep_link`, `open_url` or a custom name)
    #[serde(rename = "onTap")]
    pub on_tap: String,
    /// Button label
    pub text: String,
    /// Target for link buttons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Typed view of an inbound notification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationPayload {
    /// Deep link or web URL
    pub link: Option<String>,
    /// `aps.alert.title`
    pub alert_title: Option<String>,
    /// `aps.category`
    pub category: Option<String>,
    /// First entry of `media`
    pub media: Option<String>,
    /// `badgeAmount`, default 1
    pub badge_amount: i64,
    /// `badgeStrategy`
    pub badge_strategy: BadgeStrategy,
    /// `tapActionButtons`, malformed entries dropped
    pub tap_action_buttons: Vec<TapActionButton>,
    /// The mapping as received
    pub raw: Map<String, Value>,
}

impl NotificationPayload {
    /// Decode a payload mapping
    pub fn decode(raw: Map<String, Value>) -> Self {
        let aps = raw.get("aps").and_then(Value::as_object);

        let alert_title = aps
            .and_then(|aps| aps.get("alert"))
            .and_then(Value::as_object)
            .and_then(|alert| alert.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let category = aps
            .and_then(|aps| aps.get("category"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let media = raw
            .get("media")
            .and_then(Value::as_array)
            .and_then(|media| media.first())
            .and_then(Value::as_str)
            .map(str::to_string);

        let badge_amount = raw
            .get("badgeAmount")
            .and_then(integer)
            .unwrap_or(DEFAULT_BADGE_AMOUNT);

        let badge_strategy =
            BadgeStrategy::from_wire(raw.get("badgeStrategy").and_then(Value::as_str));

        let tap_action_buttons = raw
            .get("tapActionButtons")
            .and_then(Value::as_array)
            .map(|buttons| {
                buttons
                    .iter()
                    .filter_map(|b| serde_json::from_value(b.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            link: raw.get("link").and_then(Value::as_str).map(str::to_string),
            alert_title,
            category,
            media,
            badge_amount,
            badge_strategy,
            tap_action_buttons,
            raw,
        }
    }

    /// Decode from any JSON value; non-objects decode as an empty payload
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::decode(map),
            _ => Self::decode(Map::new()),
        }
    }
}

/// Integers may arrive as numbers or numeric strings
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
