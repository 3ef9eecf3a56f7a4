//! Analytics entry point
//!
//! [`Analytics::track`] builds a [`TrackEvent`], runs it through every
//! registered [`EventPlugin`] in order and hands the result to the
//! [`EventSink`]. The sink is the pipeline collaborator: batching, retry and
//! delivery happen behind it.

mod memory;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

pub use memory::MemorySink;
pub use types::{IdentifyEvent, Properties, PushEvent, RawEvent, ScreenEvent, TrackEvent};

/// Destination for processed events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Accept an event for delivery
    async fn dispatch(&self, event: RawEvent);
}

/// Stage that may rewrite events before dispatch
#[async_trait]
pub trait EventPlugin: Send + Sync {
    /// Plugin name (for logs)
    fn name(&self) -> &str;

    /// Transform an event
    async fn execute(&self, event: RawEvent) -> RawEvent;
}

/// Track-call front end of the analytics pipeline
pub struct Analytics {
    sink: Arc<dyn EventSink>,
    plugins: Vec<Arc<dyn EventPlugin>>,
}

impl Analytics {
    /// Create an Analytics instance dispatching to `sink`
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            plugins: Vec::new(),
        }
    }

    /// Add a plugin; plugins run in insertion order
    pub fn with_plugin(mut self, plugin: Arc<dyn EventPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Names of registered plugins
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Track a named event
    pub async fn track(&self, name: &str, properties: Properties) {
        self.process(RawEvent::Track(TrackEvent::new(name, properties)))
            .await;
    }

    /// Track a push lifecycle event
    pub async fn track_push(&self, event: PushEvent, properties: Properties) {
        self.track(event.name(), properties).await;
    }

    /// Run an event through the plugins and dispatch it
    pub async fn process(&self, mut event: RawEvent) {
        for plugin in &self.plugins {
            event = plugin.execute(event).await;
        }
        if let Some(track) = event.as_track() {
            debug!(event = %track.event, "Dispatching track event");
        }
        self.sink.dispatch(event).await;
    }
}
