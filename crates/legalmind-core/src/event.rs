//! Event bus for legalmind using tokio::broadcast
//!
//! The analyzer publishes one event per completed analysis; the web layer
//! forwards them to browsers over SSE.

use crate::hasher::Fingerprint;
use tokio::sync::broadcast;

/// Events emitted by the analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisEvent {
    /// A new summary was computed and stored
    Stored(Fingerprint),
    /// An existing summary was returned without recomputation
    CacheHit(Fingerprint),
    /// The summarizer failed for this input
    Failed(Fingerprint),
}

impl AnalysisEvent {
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Self::Stored(fp) | Self::CacheHit(fp) | Self::Failed(fp) => fp,
        }
    }

    /// Wire name used for SSE event types
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stored(_) => "analysis_stored",
            Self::CacheHit(_) => "analysis_cache_hit",
            Self::Failed(_) => "analysis_failed",
        }
    }
}

/// Event bus for broadcasting analysis events
///
/// Cloning is cheap; all clones share one channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AnalysisEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: AnalysisEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::fingerprint;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::default_capacity();
        let mut rx = bus.subscribe();
        let fp = fingerprint("clause");

        bus.publish(AnalysisEvent::Stored(fp.clone()));
        bus.publish(AnalysisEvent::CacheHit(fp.clone()));

        let event1 = rx.recv().await.unwrap();
        assert_eq!(event1, AnalysisEvent::Stored(fp.clone()));
        assert_eq!(event1.kind(), "analysis_stored");

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(event2, AnalysisEvent::CacheHit(ref f) if *f == fp));
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::default_capacity();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();

        bus.publish(AnalysisEvent::Failed(fingerprint("x")));

        assert_eq!(rx1.recv().await.unwrap().kind(), "analysis_failed");
        assert_eq!(rx2.recv().await.unwrap().kind(), "analysis_failed");
    }

    #[test]
    fn test_event_bus_no_subscribers_ok() {
        let bus = EventBus::default_capacity();
        bus.publish(AnalysisEvent::Stored(fingerprint("x")));
    }
}
