//! Subscription status, platform permission state and device token

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The app's belief about whether the user receives push notifications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Permission granted and registered
    Subscribed,
    /// Was subscribed, then turned notifications off
    Unsubscribed,
    /// Never subscribed (or declined)
    #[default]
    DidNotSubscribe,
}

impl SubscriptionStatus {
    /// Persisted and reported representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribed => "SUBSCRIBED",
            Self::Unsubscribed => "UNSUBSCRIBED",
            Self::DidNotSubscribe => "DID_NOT_SUBSCRIBE",
        }
    }

    /// Status implied by a permission state, given the current status.
    ///
    /// A denial only counts as an opt-out if the user was subscribed before.
    /// A second denial settles on `DidNotSubscribe`, which is then stable.
    pub fn target_for(self, permission: PermissionState) -> Self {
        match permission {
            PermissionState::NotDetermined => Self::DidNotSubscribe,
            PermissionState::Denied => match self {
                Self::Subscribed => Self::Unsubscribed,
                Self::Unsubscribed | Self::DidNotSubscribe => Self::DidNotSubscribe,
            },
            PermissionState::Authorized
            | PermissionState::Provisional
            | PermissionState::Ephemeral => Self::Subscribed,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBSCRIBED" => Ok(Self::Subscribed),
            "UNSUBSCRIBED" => Ok(Self::Unsubscribed),
            "DID_NOT_SUBSCRIBE" => Ok(Self::DidNotSubscribe),
            other => Err(format!("unknown subscription status: {}", other)),
        }
    }
}

/// Platform notification authorization state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
    Ephemeral,
}

impl PermissionState {
    /// Any variant of granted
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Authorized | Self::Provisional | Self::Ephemeral)
    }
}

impl FromStr for PermissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "not_determined" | "undetermined" => Ok(Self::NotDetermined),
            "denied" => Ok(Self::Denied),
            "authorized" => Ok(Self::Authorized),
            "provisional" => Ok(Self::Provisional),
            "ephemeral" => Ok(Self::Ephemeral),
            other => Err(format!("unknown permission state: {}", other)),
        }
    }
}

/// Opaque push token, present only after successful registration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(String);

impl DeviceToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Render raw token bytes as lowercase hex
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A status change observed by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: SubscriptionStatus,
    pub to: SubscriptionStatus,
}
