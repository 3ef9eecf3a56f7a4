//! Notification service extension
//!
//! Runs in its own short-lived process before a notification is shown. It
//! shares nothing with the app except the [`KeyValueStore`](crate::store::KeyValueStore)
//! and the content it hands back.

mod actions;
mod badge;
mod content;
mod media;
mod processor;

pub use actions::{
    CategorySink, CategoryUpdate, GENERATED_CATEGORY_PREFIX, MAX_GENERATED_CATEGORIES,
    NoopCategorySink, NotificationAction, NotificationCategory, PreparedAction, categories,
    forget_actions, generated_category, register_category,
};
pub use badge::{apply_badge, badge_count, reset_badge};
pub use content::{Attachment, NotificationContent};
pub use media::{AttachmentWriter, DEFAULT_MEDIA_FILE_NAME, HttpMediaFetcher, MediaFetcher};
pub use processor::{Completion, Processed, ServiceExtension};
