//! In-memory EventSink implementation
//!
//! MemorySink stores dispatched events in a Vec for inspection and uses a
//! broadcast channel for live subscribers.

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use super::EventSink;
use super::types::{RawEvent, TrackEvent};

/// In-memory implementation of EventSink
pub struct MemorySink {
    /// Dispatched events, oldest first
    events: RwLock<Vec<RawEvent>>,
    /// Broadcast channel for live subscribers
    tx: broadcast::Sender<RawEvent>,
}

impl MemorySink {
    /// Create a new MemorySink with the given broadcast channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            events: RwLock::new(Vec::new()),
            tx,
        }
    }

    /// Subscribe to events dispatched from now on
    pub fn subscribe(&self) -> broadcast::Receiver<RawEvent> {
        self.tx.subscribe()
    }

    /// All dispatched events
    pub async fn events(&self) -> Vec<RawEvent> {
        self.events.read().await.clone()
    }

    /// All dispatched track events
    pub async fn tracks(&self) -> Vec<TrackEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter_map(|e| e.as_track().cloned())
            .collect()
    }

    /// Names of dispatched track events
    pub async fn names(&self) -> Vec<String> {
        self.tracks().await.into_iter().map(|t| t.event).collect()
    }

    /// Drop recorded events
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn dispatch(&self, event: RawEvent) {
        self.events.write().await.push(event.clone());

        // Broadcast to live subscribers (ignore if no receivers)
        let _ = self.tx.send(event);
    }
}
