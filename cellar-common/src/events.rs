//! Event types and EventBus for the cellar backend
//!
//! Change notifications are distributed through an explicit broadcast
//! channel scoped to the application state, not through global mutable
//! listener registries. Subscribers (SSE clients, caches) receive every
//! event emitted after they subscribe.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Cellar change events
///
/// Events are broadcast via [`EventBus`] and serialized for SSE
/// transmission to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CellarEvent {
    /// A wine record was created
    WineCreated {
        wine_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A wine record was updated (including quantity changes)
    WineUpdated {
        wine_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A wine record was deleted
    WineDeleted {
        wine_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A photo object was stored
    PhotoUploaded {
        /// Stored-object key
        key: String,
        /// Object size in bytes
        size: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The primary photo of a wine changed
    PrimaryPhotoChanged {
        wine_id: Uuid,
        photo_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A collection import finished (all phases attempted)
    ImportCompleted {
        wineries_imported: i64,
        varietals_imported: i64,
        wines_imported: i64,
        /// Total per-record errors across all phases
        error_count: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CellarEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &str {
        match self {
            CellarEvent::WineCreated { .. } => "WineCreated",
            CellarEvent::WineUpdated { .. } => "WineUpdated",
            CellarEvent::WineDeleted { .. } => "WineDeleted",
            CellarEvent::PhotoUploaded { .. } => "PhotoUploaded",
            CellarEvent::PrimaryPhotoChanged { .. } => "PrimaryPhotoChanged",
            CellarEvent::ImportCompleted { .. } => "ImportCompleted",
        }
    }
}

/// Central event distribution bus for application-wide events
///
/// Wraps `tokio::broadcast`, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CellarEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CellarEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CellarEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<CellarEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CellarEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_emit_and_receive() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let wine_id = Uuid::new_v4();
        bus.emit(CellarEvent::WineCreated {
            wine_id,
            timestamp: chrono::Utc::now(),
        })
        .expect("emit should succeed");

        let received = rx.try_recv().expect("should receive event");
        assert_eq!(received.event_type(), "WineCreated");
        match received {
            CellarEvent::WineCreated { wine_id: id, .. } => assert_eq!(id, wine_id),
            other => panic!("wrong event received: {:?}", other),
        }
    }

    #[test]
    fn test_eventbus_emit_lossy_without_subscribers() {
        let bus = EventBus::new(2);

        // No subscribers; must not panic or error out
        bus.emit_lossy(CellarEvent::PhotoUploaded {
            key: "photos/test.jpg".to_string(),
            size: 1024,
            timestamp: chrono::Utc::now(),
        });
    }

    #[test]
    fn test_eventbus_multiple_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(CellarEvent::ImportCompleted {
            wineries_imported: 2,
            varietals_imported: 1,
            wines_imported: 5,
            error_count: 0,
            timestamp: chrono::Utc::now(),
        })
        .expect("emit should succeed");

        assert_eq!(
            rx1.try_recv().expect("rx1 receives").event_type(),
            "ImportCompleted"
        );
        assert_eq!(
            rx2.try_recv().expect("rx2 receives").event_type(),
            "ImportCompleted"
        );
    }

    #[test]
    fn test_event_serialization_for_sse() {
        let event = CellarEvent::PrimaryPhotoChanged {
            wine_id: Uuid::nil(),
            photo_id: Uuid::nil(),
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"type\":\"PrimaryPhotoChanged\""));

        let back: CellarEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.event_type(), "PrimaryPhotoChanged");
    }
}
