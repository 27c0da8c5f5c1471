//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DisplayEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use marquee_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// Addressing target for an event: a sync group's room or a single
/// display's room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "lowercase")]
pub enum Room {
    Group(DbId),
    Display(DbId),
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Room::Group(id) => write!(f, "group:{id}"),
            Room::Display(id) => write!(f, "display:{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayEvent
// ---------------------------------------------------------------------------

/// A room-scoped domain event.
///
/// Constructed via [`DisplayEvent::new`] and enriched with
/// [`with_payload`](DisplayEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayEvent {
    /// Colon-separated event name, e.g. `"sync:tick"` (see [`crate::names`]).
    pub event_type: String,

    /// The room the transport must deliver this event to.
    pub room: Room,

    /// Event-specific payload; field names are camelCase and stable across
    /// source kinds.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DisplayEvent {
    /// Create a new event with an empty payload.
    pub fn new(event_type: impl Into<String>, room: Room) -> Self {
        Self {
            event_type: event_type.into(),
            room,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DisplayEvent`]. Room filtering
/// happens at the subscriber: the transport delivers each event to the
/// sockets joined to `event.room`.
pub struct EventBus {
    sender: broadcast::Sender<DisplayEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DisplayEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
