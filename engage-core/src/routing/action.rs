//! Action identifier parsing

use std::fmt;

/// Action identifier the platform reports when the notification body is tapped
pub const DEFAULT_ACTION_IDENTIFIER: &str = "com.apple.UNNotificationDefaultActionIdentifier";

/// What a tap or button asks for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// The notification body was tapped
    DefaultTap,
    /// Bring the app to the foreground
    OpenApp,
    /// Navigate inside the app
    DeepLink,
    /// Open a URL outside the app
    OpenUrl,
    /// Application-defined action
    Custom(String),
}

impl ActionKind {
    /// Classify a kind name. Also used for category identifiers.
    pub fn from_name(name: &str) -> Self {
        match name {
            DEFAULT_ACTION_IDENTIFIER => Self::DefaultTap,
            "open_app" => Self::OpenApp,
            "deep_link" => Self::DeepLink,
            "open_url" => Self::OpenUrl,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DefaultTap => DEFAULT_ACTION_IDENTIFIER,
            Self::OpenApp => "open_app",
            Self::DeepLink => "deep_link",
            Self::OpenUrl => "open_url",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `<kind>-<id>` action identifier
///
/// The string is split on the first `-` only, so ids may contain dashes
/// (button ids are UUIDs). A missing id is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionIdentifier {
    pub kind: ActionKind,
    pub id: String,
}

impl ActionIdentifier {
    pub fn parse(raw: &str) -> Self {
        let (kind, id) = raw.split_once('-').unwrap_or((raw, ""));
        Self {
            kind: ActionKind::from_name(kind),
            id: id.to_string(),
        }
    }

    /// Identifier for a dynamic button with the given id
    pub fn button(kind: &str, id: &str) -> String {
        format!("{}-{}", kind, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tap_sentinel() {
        let action = ActionIdentifier::parse(DEFAULT_ACTION_IDENTIFIER);
        assert_eq!(action.kind, ActionKind::DefaultTap);
        assert_eq!(action.id, "");
    }

    #[test]
    fn splits_on_first_dash_only() {
        let action = ActionIdentifier::parse("deep_link-1b4e28ba-2fa1-11d2-883f-0016d3cca427");
        assert_eq!(action.kind, ActionKind::DeepLink);
        assert_eq!(action.id, "1b4e28ba-2fa1-11d2-883f-0016d3cca427");
    }

    #[test]
    fn missing_id_is_empty() {
        assert_eq!(
            ActionIdentifier::parse("open_app"),
            ActionIdentifier {
                kind: ActionKind::OpenApp,
                id: String::new(),
            }
        );
        assert_eq!(ActionIdentifier::parse("").kind, ActionKind::Custom(String::new()));
    }

    #[test]
    fn unknown_kinds_are_custom() {
        let action = ActionIdentifier::parse("accept-42");
        assert_eq!(action.kind, ActionKind::Custom("accept".into()));
        assert_eq!(action.kind.to_string(), "accept");
        assert_eq!(action.id, "42");
    }

    #[test]
    fn button_identifier_parses_back() {
        let raw = ActionIdentifier::button("open_url", "abc-def");
        assert_eq!(raw, "open_url-abc-def");
        let action = ActionIdentifier::parse(&raw);
        assert_eq!(action.kind, ActionKind::OpenUrl);
        assert_eq!(action.id, "abc-def");
    }
}
