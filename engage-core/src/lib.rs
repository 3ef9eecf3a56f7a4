//! engage-core: push notification lifecycle for analytics-enabled apps
//!
//! This crate provides the pieces an app and its notification service
//! extension need to take part in push messaging:
//!
//! - **Subscription status** - [`SubscriptionManager`] keeps the persisted
//!   subscription status in line with the platform permission state
//! - **Enrichment** - [`EventEnricher`] adds dedup ids and subscription
//!   context to push lifecycle events before dispatch
//! - **Routing** - [`ActionRouter`] turns notification taps and button
//!   presses into URL opens or [`OpenSignal`]s
//! - **Service extension** - [`ServiceExtension`] sets the badge, downloads
//!   media and registers action buttons before a notification is shown
//! - **Shared store** - [`KeyValueStore`] with in-memory and file-backed
//!   implementations, the only state shared between app and extension
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use engage_core::{
//!     Engage, EnrichmentPolicy, FileStore, FixedPermission, MemorySink, NoopHost,
//! };
//! use engage_core::subscription::PermissionState;
//!
//! async fn example() {
//!     let engage = Engage::new(
//!         Arc::new(FileStore::new("/tmp/engage/store.json")),
//!         Arc::new(MemorySink::new(64)),
//!         Arc::new(NoopHost),
//!         Arc::new(FixedPermission(PermissionState::Authorized)),
//!         EnrichmentPolicy::default(),
//!     );
//!
//!     engage.configure().await;
//!     println!("status: {}", engage.status().await);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//!  app process                                   extension process
//! ┌──────────────────────────────────────┐      ┌──────────────────────┐
//! │ Engage                               │      │ ServiceExtension     │
//! │  ├─ SubscriptionManager ──┐          │      │  badge, media,       │
//! │  ├─ ActionRouter ─────────┼──────────┼──┐   │  action buttons      │
//! │  └─ Analytics             │          │  │   └──────────┬───────────┘
//! │      └─ EventEnricher ────┤          │  │              │
//! └───────────────────────────┼──────────┘  │              │
//!                             ▼             ▼              ▼
//!                     ┌──────────────────────────────────────┐
//!                     │            KeyValueStore             │
//!                     └──────────────────────────────────────┘
//! ```

pub mod analytics;
pub mod config;
pub mod engage;
pub mod enrich;
pub mod error;
pub mod extension;
pub mod host;
pub mod payload;
pub mod routing;
pub mod store;
pub mod subscription;

// Re-export key types for convenience
pub use analytics::{
    Analytics, EventPlugin, EventSink, MemorySink, PushEvent, RawEvent, TrackEvent,
};
pub use config::EngageConfig;
pub use engage::Engage;
pub use enrich::{EnrichmentPolicy, EventEnricher};
pub use error::{ConfigError, EngageError, MediaError, StoreError};
pub use extension::{
    CategorySink, HttpMediaFetcher, MediaFetcher, NotificationContent, ServiceExtension,
};
pub use host::{FixedPermission, NoopHost, PermissionProvider, PushHost, RecordingHost};
pub use payload::{BadgeStrategy, NotificationPayload};
pub use routing::{ActionRouter, OpenSignal, RouteOutcome};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreKey, StoreValue};
pub use subscription::{DeviceToken, SubscriptionManager, SubscriptionStatus};
