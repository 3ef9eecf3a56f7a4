//! Service extension and badge commands

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use engage_core::extension::{AttachmentWriter, badge_count};
use engage_core::subscription::PermissionState;
use engage_core::{HttpMediaFetcher, NotificationContent, ServiceExtension};

use super::{Context, read_payload};
use crate::output::{JsonCategorySink, emit};

/// Arguments for `engage extension`
#[derive(Args, Debug)]
pub struct ExtensionArgs {
    /// Notification payload file, or `-` for stdin
    #[arg(long)]
    pub payload: PathBuf,

    /// Override the configured processing deadline
    #[arg(long)]
    pub deadline_ms: Option<u64>,
}

/// Process a notification the way the service extension would
pub async fn run(ctx: &Context, args: ExtensionArgs) -> Result<()> {
    let payload = read_payload(&args.payload)?;
    let settings = &ctx.config.extension;

    let media_root = engage_paths::media_dir(&engage_paths::cache_dir());
    let deadline = args
        .deadline_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.deadline());

    let extension = ServiceExtension::new(
        ctx.store.clone(),
        Arc::new(HttpMediaFetcher::new()),
        Arc::new(JsonCategorySink),
    )
    .with_attachment_writer(AttachmentWriter::new(media_root, &settings.media_file_name))
    .with_deadline(deadline);

    extension
        .process(NotificationContent::from_user_info(payload), |content| {
            emit(&content_line(&content))
        })
        .await;
    Ok(())
}

/// JSON line carrying the content handed back to the platform
fn content_line(content: &NotificationContent) -> serde_json::Value {
    json!({"type": "content", "content": content})
}

/// Zero the shared badge count
pub async fn reset_badge(ctx: &Context) -> Result<()> {
    ctx.engage(PermissionState::NotDetermined).reset_badge().await;
    emit(&json!({"badge": badge_count(ctx.store.as_ref()).await?}));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engage_core::{EngageConfig, KeyValueStore, StoreKey, StoreValue};
    use tempfile::TempDir;

    #[test]
    fn test_content_line() {
        let content = NotificationContent {
            badge: Some(3),
            ..Default::default()
        };
        let line = content_line(&content);
        assert_eq!(line["type"], json!("content"));
        assert_eq!(line["content"]["badge"], json!(3));
    }

    #[tokio::test]
    async fn test_extension_updates_shared_badge() {
        let temp_dir = TempDir::new().unwrap();
        let payload = temp_dir.path().join("payload.json");
        std::fs::write(&payload, r#"{"badgeAmount": 2, "badgeStrategy": "inc"}"#).unwrap();

        let ctx = Context::new(
            EngageConfig::default(),
            Some(temp_dir.path().join("store.json")),
        );
        ctx.store
            .set(&StoreKey::Count, StoreValue::Integer(5))
            .await
            .unwrap();

        run(
            &ctx,
            ExtensionArgs {
                payload,
                deadline_ms: Some(5_000),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            ctx.store.get(&StoreKey::Count).await.unwrap(),
            Some(StoreValue::Integer(7))
        );
    }
}
