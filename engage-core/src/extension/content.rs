//! Mutable notification content handed to the service extension

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::payload::NotificationPayload;

/// A file attached to the displayed notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment identifier (the file name)
    pub identifier: String,
    /// Where the file was written
    pub path: PathBuf,
    /// Where it was downloaded from
    pub source: String,
}

/// Notification content as the extension sees and returns it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// The notification payload
    #[serde(default)]
    pub user_info: Map<String, Value>,
}

impl NotificationContent {
    /// Build content from a raw payload the way the platform would
    pub fn from_user_info(user_info: Map<String, Value>) -> Self {
        let alert = user_info
            .get("aps")
            .and_then(|aps| aps.get("alert"))
            .and_then(Value::as_object);
        let alert_field = |field: &str| {
            alert
                .and_then(|alert| alert.get(field))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let title = alert_field("title");
        let body = alert_field("body");

        let category_identifier = user_info
            .get("aps")
            .and_then(|aps| aps.get("category"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            title,
            body,
            category_identifier,
            user_info,
            ..Default::default()
        }
    }

    /// Typed view of `user_info`
    pub fn payload(&self) -> NotificationPayload {
        NotificationPayload::decode(self.user_info.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_user_info_reads_alert_and_category() {
        let Value::Object(user_info) = json!({
            "aps": {"alert": {"title": "Sale", "body": "50% off"}, "category": "open_url"},
            "link": "https://example.com"
        }) else {
            unreachable!()
        };

        let content = NotificationContent::from_user_info(user_info);
        assert_eq!(content.title.as_deref(), Some("Sale"));
        assert_eq!(content.body.as_deref(), Some("50% off"));
        assert_eq!(content.category_identifier.as_deref(), Some("open_url"));
        assert_eq!(content.badge, None);
        assert_eq!(content.payload().link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn serializes_without_empty_fields() {
        let content = NotificationContent {
            badge: Some(3),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({"badge": 3, "user_info": {}})
        );
    }
}
