//! The server-driven playback clock.
//!
//! A single fixed-interval task computes the current position of every
//! Playing group and fans a tick out to the group's room. The protocol is
//! server-authoritative: clients never negotiate time with each other, and
//! the server timestamp carried in each tick is the only clock that
//! matters. Under normal network conditions that bounds inter-display
//! drift at roughly two tick intervals.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use marquee_core::content::ContentRef;
use marquee_core::types::{DbId, Timestamp};
use marquee_events::{names, DisplayEvent, EventBus, Room};

use crate::group::PlaybackState;
use crate::store::SyncRuntimeStore;

/// Default tick cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Payload of a `sync:tick` event. Field names are part of the wire
/// contract with rendering clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickPayload {
    pub group_id: DbId,
    pub content_ref: Option<ContentRef>,
    pub current_time: f64,
    pub playback_state: PlaybackState,
    pub server_timestamp: Timestamp,
}

/// Background service that broadcasts position ticks for playing groups.
pub struct TickBroadcaster {
    store: Arc<SyncRuntimeStore>,
    bus: Arc<EventBus>,
    interval: Duration,
}

impl TickBroadcaster {
    /// Create a broadcaster with the default 100 ms cadence.
    pub fn new(store: Arc<SyncRuntimeStore>, bus: Arc<EventBus>) -> Self {
        Self::with_interval(store, bus, DEFAULT_TICK_INTERVAL)
    }

    /// Create a broadcaster with a specific cadence.
    pub fn with_interval(
        store: Arc<SyncRuntimeStore>,
        bus: Arc<EventBus>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            bus,
            interval,
        }
    }

    /// Run the tick loop.
    ///
    /// Exits gracefully when the provided [`CancellationToken`] is
    /// cancelled; the in-flight iteration always completes first, so no
    /// broadcast is cut off mid-fan-out.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Tick broadcaster cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.broadcast_ticks().await;
                }
            }
        }
    }

    /// Emit one tick per currently Playing group.
    async fn broadcast_ticks(&self) {
        let snapshots = self.store.playing_snapshots().await;
        let server_timestamp = Utc::now();
        for snapshot in snapshots {
            let payload = TickPayload {
                group_id: snapshot.id,
                content_ref: snapshot.content,
                current_time: snapshot.position_secs,
                playback_state: snapshot.playback_state,
                server_timestamp,
            };
            self.bus.publish(
                DisplayEvent::new(names::SYNC_TICK, Room::Group(snapshot.id))
                    .with_payload(json!(payload)),
            );
        }
    }
}
