//! Capabilities provided by the host application
//!
//! engage never touches platform APIs directly. The host implements these
//! traits and passes them in at construction time.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use crate::subscription::PermissionState;

/// Platform operations engage asks the host to perform
pub trait PushHost: Send + Sync {
    /// Ask the OS to register for remote notifications.
    ///
    /// Fire-and-forget: the result comes back through
    /// `SubscriptionManager::on_registered` or `on_registration_failed`.
    fn register_for_remote_notifications(&self);

    /// Open a URL outside the app
    fn open_url(&self, url: &Url);
}

/// Source of the platform's notification permission state
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Query the current authorization status
    async fn authorization_status(&self) -> PermissionState;
}

/// Permission provider that always reports the same state
#[derive(Debug, Clone, Copy)]
pub struct FixedPermission(pub PermissionState);

#[async_trait]
impl PermissionProvider for FixedPermission {
    async fn authorization_status(&self) -> PermissionState {
        self.0
    }
}

/// Host that ignores every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl PushHost for NoopHost {
    fn register_for_remote_notifications(&self) {}

    fn open_url(&self, _url: &Url) {}
}

/// Host that records requests, for tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingHost {
    registrations: AtomicUsize,
    opened: Mutex<Vec<Url>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registration requests received
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    /// URLs opened so far, oldest first
    pub fn opened(&self) -> Vec<Url> {
        match self.opened.lock() {
            Ok(opened) => opened.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PushHost for RecordingHost {
    fn register_for_remote_notifications(&self) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
    }

    fn open_url(&self, url: &Url) {
        match self.opened.lock() {
            Ok(mut opened) => opened.push(url.clone()),
            Err(poisoned) => poisoned.into_inner().push(url.clone()),
        }
    }
}
