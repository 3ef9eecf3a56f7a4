//! Dynamic action buttons and the category registry
//!
//! Each `tapActionButtons` entry becomes a [`NotificationAction`] whose
//! identifier is `<onTap>-<uuid>`. Data the router needs later is stashed
//! in the store under the button's uuid. Categories accumulate in the store
//! under `Categories`; a registration never removes an action from a
//! category. Categories generated for notifications that arrive without one
//! are capped at [`MAX_GENERATED_CATEGORIES`], oldest first.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::payload::TapActionButton;
use crate::routing::{ActionIdentifier, ActionKind};
use crate::store::{KeyValueStore, StoreKey, StoreValue};

/// Prefix of category identifiers generated by the extension
pub const GENERATED_CATEGORY_PREFIX: &str = "engage-";

/// Generated categories kept in the registry
pub const MAX_GENERATED_CATEGORIES: usize = 32;

/// A button shown on the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub identifier: String,
    pub title: String,
}

impl NotificationAction {
    /// Store keys that may hold data for this button
    fn stash_keys(&self) -> Vec<StoreKey> {
        let parsed = ActionIdentifier::parse(&self.identifier);
        if parsed.id.is_empty() {
            return Vec::new();
        }
        match parsed.kind {
            ActionKind::OpenUrl => vec![StoreKey::ActionLink(parsed.id)],
            ActionKind::DeepLink => vec![StoreKey::ActionDeepLink(parsed.id)],
            ActionKind::Custom(_) => vec![StoreKey::CustomAction(parsed.id)],
            ActionKind::OpenApp | ActionKind::DefaultTap => Vec::new(),
        }
    }
}

/// A named group of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCategory {
    pub identifier: String,
    pub actions: Vec<NotificationAction>,
}

impl NotificationCategory {
    /// Append actions whose identifiers are not registered yet
    fn absorb(&mut self, actions: &[NotificationAction]) {
        for action in actions {
            if !self.actions.iter().any(|a| a.identifier == action.identifier) {
                self.actions.push(action.clone());
            }
        }
    }

    /// Whether the extension generated this category
    pub fn is_generated(&self) -> bool {
        self.identifier.starts_with(GENERATED_CATEGORY_PREFIX)
    }
}

/// Identifier for a notification that arrived without a category
pub fn generated_category() -> String {
    format!("{}{}", GENERATED_CATEGORY_PREFIX, Uuid::new_v4())
}

/// Receives the complete category set after each registration
pub trait CategorySink: Send + Sync {
    fn set_categories(&self, categories: &[NotificationCategory]);
}

/// Sink that discards categories
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCategorySink;

impl CategorySink for NoopCategorySink {
    fn set_categories(&self, _categories: &[NotificationCategory]) {}
}

/// An action built from a button, with the data the router will need.
///
/// Building is pure; nothing touches the store until [`stash`](Self::stash).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAction {
    pub action: NotificationAction,
    stash: Option<(StoreKey, StoreValue)>,
}

impl PreparedAction {
    pub fn new(button: &TapActionButton) -> Self {
        let id = Uuid::new_v4().to_string();

        let stash = match (ActionKind::from_name(&button.on_tap), &button.link) {
            (ActionKind::OpenUrl, Some(link)) => {
                Some((StoreKey::ActionLink(id.clone()), link.as_str().into()))
            }
            (ActionKind::DeepLink, Some(link)) => {
                Some((StoreKey::ActionDeepLink(id.clone()), link.as_str().into()))
            }
            (ActionKind::OpenUrl | ActionKind::DeepLink, None) => {
                debug!(on_tap = %button.on_tap, "Link button without a link");
                None
            }
            (ActionKind::Custom(name), _) => Some((StoreKey::CustomAction(id.clone()), name.into())),
            (ActionKind::OpenApp | ActionKind::DefaultTap, _) => None,
        };

        Self {
            action: NotificationAction {
                identifier: ActionIdentifier::button(&button.on_tap, &id),
                title: button.text.clone(),
            },
            stash,
        }
    }

    /// Key the router will consume, if the button carries data
    pub fn stash_key(&self) -> Option<&StoreKey> {
        self.stash.as_ref().map(|(key, _)| key)
    }

    /// Write the button's data to the store
    pub async fn stash(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        match &self.stash {
            Some((key, value)) => store.set(key, value.clone()).await,
            None => Ok(()),
        }
    }
}

/// Result of a registration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    /// Full category set after the merge
    pub categories: Vec<NotificationCategory>,
    /// Generated categories dropped to stay under the cap
    pub evicted: Vec<NotificationCategory>,
}

/// Merge `actions` into the stored registry under `category`
pub async fn register_category(
    store: &dyn KeyValueStore,
    category: &str,
    actions: &[NotificationAction],
) -> Result<CategoryUpdate, StoreError> {
    let merged = OnceLock::new();
    let merge = |current: Option<StoreValue>| {
        let mut categories = decode_categories(current);
        match categories.iter_mut().find(|c| c.identifier == category) {
            Some(existing) => existing.absorb(actions),
            None => categories.push(NotificationCategory {
                identifier: category.to_string(),
                actions: actions.to_vec(),
            }),
        }
        let evicted = evict_generated(&mut categories, category);

        let encoded = serde_json::to_string(&categories).ok();
        let _ = merged.set(CategoryUpdate {
            categories,
            evicted,
        });
        encoded.map(StoreValue::Text)
    };

    store.update(&StoreKey::Categories, &merge).await?;
    Ok(merged.into_inner().unwrap_or_default())
}

/// Drop the oldest generated categories beyond the cap, never `keep`
fn evict_generated(
    categories: &mut Vec<NotificationCategory>,
    keep: &str,
) -> Vec<NotificationCategory> {
    let generated = categories.iter().filter(|c| c.is_generated()).count();
    let mut excess = generated.saturating_sub(MAX_GENERATED_CATEGORIES);
    let mut evicted = Vec::new();

    categories.retain(|c| {
        if excess > 0 && c.is_generated() && c.identifier != keep {
            excess -= 1;
            evicted.push(c.clone());
            false
        } else {
            true
        }
    });
    evicted
}

/// Remove stashed button data for categories that are no longer registered
pub async fn forget_actions(store: &dyn KeyValueStore, categories: &[NotificationCategory]) {
    for key in categories
        .iter()
        .flat_map(|c| c.actions.iter())
        .flat_map(NotificationAction::stash_keys)
    {
        if let Err(e) = store.remove(&key).await {
            warn!(%key, "Failed to remove stale action data: {}", e);
        }
    }
}

/// Read the stored registry
pub async fn categories(
    store: &dyn KeyValueStore,
) -> Result<Vec<NotificationCategory>, StoreError> {
    Ok(decode_categories(store.get(&StoreKey::Categories).await?))
}

fn decode_categories(value: Option<StoreValue>) -> Vec<NotificationCategory> {
    match value {
        None => Vec::new(),
        Some(StoreValue::Text(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Discarding unreadable category registry: {}", e);
            Vec::new()
        }),
        Some(StoreValue::Integer(_)) => {
            warn!("Discarding category registry stored as an integer");
            Vec::new()
        }
    }
}
