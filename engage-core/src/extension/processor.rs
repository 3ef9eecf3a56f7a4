//! ServiceExtension: per-notification processing under a deadline
//!
//! Steps run in order (badge, media, dynamic actions) and each one writes
//! its result into a best-attempt copy of the content. When the deadline
//! elapses the step future is dropped and whatever the copy holds at that
//! point is delivered. The completion handler runs exactly once either way.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::actions::{
    CategorySink, NotificationAction, PreparedAction, forget_actions, generated_category,
    register_category,
};
use super::badge::apply_badge;
use super::content::{Attachment, NotificationContent};
use super::media::{AttachmentWriter, MediaFetcher};
use crate::config::{DEFAULT_DEADLINE_MS, ExtensionSection};
use crate::payload::NotificationPayload;
use crate::store::KeyValueStore;

/// Guard around a completion handler that lets it run at most once
pub struct Completion<F>
where
    F: FnOnce(NotificationContent),
{
    handler: Option<F>,
}

impl<F> Completion<F>
where
    F: FnOnce(NotificationContent),
{
    pub fn new(handler: F) -> Self {
        Self {
            handler: Some(handler),
        }
    }

    /// Deliver `content`. Returns false if the handler already ran.
    pub fn complete(&mut self, content: NotificationContent) -> bool {
        match self.handler.take() {
            Some(handler) => {
                handler(content);
                true
            }
            None => {
                warn!("Notification content already delivered");
                false
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.handler.is_none()
    }
}

/// Content produced by one run
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub content: NotificationContent,
    /// The deadline elapsed before every step finished
    pub timed_out: bool,
}

/// Mutates notification content before display
pub struct ServiceExtension {
    store: Arc<dyn KeyValueStore>,
    fetcher: Arc<dyn MediaFetcher>,
    categories: Arc<dyn CategorySink>,
    writer: AttachmentWriter,
    deadline: Duration,
}

impl ServiceExtension {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn MediaFetcher>,
        categories: Arc<dyn CategorySink>,
    ) -> Self {
        Self {
            store,
            fetcher,
            categories,
            writer: AttachmentWriter::default(),
            deadline: Duration::from_millis(DEFAULT_DEADLINE_MS),
        }
    }

    /// Apply deadline and media file name from configuration
    pub fn with_settings(self, settings: &ExtensionSection) -> Self {
        let root = self.writer.root().to_path_buf();
        self.with_deadline(settings.deadline())
            .with_attachment_writer(AttachmentWriter::new(root, &settings.media_file_name))
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_attachment_writer(mut self, writer: AttachmentWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Process `content` and hand the result to `complete`
    pub async fn process<F>(&self, content: NotificationContent, complete: F)
    where
        F: FnOnce(NotificationContent) + Send,
    {
        let mut completion = Completion::new(complete);
        let processed = self.run(content).await;
        completion.complete(processed.content);
    }

    /// Decode a raw payload into content, then [`process`](Self::process) it
    pub async fn process_payload<F>(&self, payload: Value, complete: F)
    where
        F: FnOnce(NotificationContent) + Send,
    {
        let user_info = match payload {
            Value::Object(map) => map,
            other => {
                warn!("Notification payload is not an object: {}", other);
                Default::default()
            }
        };
        self.process(NotificationContent::from_user_info(user_info), complete)
            .await;
    }

    /// Run every step within the deadline and return the best attempt
    pub async fn run(&self, content: NotificationContent) -> Processed {
        let best = RwLock::new(content);

        let timed_out = tokio::time::timeout(self.deadline, self.steps(&best))
            .await
            .is_err();
        if timed_out {
            warn!(
                deadline_ms = self.deadline.as_millis() as u64,
                "Extension deadline elapsed, delivering best attempt"
            );
        }

        Processed {
            content: best.into_inner(),
            timed_out,
        }
    }

    async fn steps(&self, best: &RwLock<NotificationContent>) {
        let payload = best.read().await.payload();

        let (strategy, amount) = (payload.badge_strategy, payload.badge_amount);
        match apply_badge(self.store.as_ref(), strategy, amount).await {
            Ok(count) => best.write().await.badge = Some(count),
            Err(e) => warn!("Failed to update badge count: {}", e),
        }

        if let Some(attachment) = self.attachment(&payload).await {
            best.write().await.attachments = vec![attachment];
        }

        if !payload.tap_action_buttons.is_empty() {
            self.register_actions(best, &payload).await;
        }

        debug!("Extension steps finished");
    }

    async fn attachment(&self, payload: &NotificationPayload) -> Option<Attachment> {
        let link = payload.media.as_deref()?;
        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(e) => {
                debug!(link, "Ignoring invalid media URL: {}", e);
                return None;
            }
        };

        let data = match self.fetcher.fetch(&url).await {
            Ok(data) => data,
            Err(e) => {
                warn!(%url, "Failed to fetch media: {}", e);
                return None;
            }
        };

        match self.writer.write(&url, &data).await {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                warn!(%url, "Failed to save media: {}", e);
                None
            }
        }
    }

    /// Register the category first so every stashed value belongs to a
    /// registered button. A deadline hit while stashing leaves buttons that
    /// route to a no-op, never data that no button can reach.
    async fn register_actions(
        &self,
        best: &RwLock<NotificationContent>,
        payload: &NotificationPayload,
    ) {
        let prepared: Vec<PreparedAction> = payload
            .tap_action_buttons
            .iter()
            .map(PreparedAction::new)
            .collect();
        let actions: Vec<NotificationAction> =
            prepared.iter().map(|p| p.action.clone()).collect();

        let category = {
            let mut content = best.write().await;
            content
                .category_identifier
                .get_or_insert_with(generated_category)
                .clone()
        };

        let update = match register_category(self.store.as_ref(), &category, &actions).await {
            Ok(update) => update,
            Err(e) => {
                warn!(%category, "Failed to register notification actions: {}", e);
                return;
            }
        };
        info!(%category, actions = actions.len(), "Registered notification actions");
        self.categories.set_categories(&update.categories);

        for action in &prepared {
            if let Err(e) = action.stash(self.store.as_ref()).await {
                warn!(action = %action.action.identifier, "Failed to store action data: {}", e);
            }
        }

        if !update.evicted.is_empty() {
            debug!(evicted = update.evicted.len(), "Dropping stale generated categories");
            forget_actions(self.store.as_ref(), &update.evicted).await;
        }
    }
}
