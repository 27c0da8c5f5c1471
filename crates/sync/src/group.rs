//! Per-group playback state machine.
//!
//! Transitions: `Stopped --start--> Playing`, `Playing --pause--> Paused`,
//! `Paused --resume--> Playing`, `Playing|Paused --seek--> same state`,
//! `* --stop--> Stopped` (position reset to 0). Invalid transitions return
//! `false` and leave the state untouched; the store logs and ignores them.
//!
//! The position invariant: `position_secs` is monotonically non-decreasing
//! while Playing (it accrues wall time from `started_at`) and frozen while
//! Paused.

use marquee_core::content::ContentRef;
use marquee_core::schedule::ScheduleWindow;
use marquee_core::types::{ConnectionId, DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// Transport state of a sync group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// The member display currently designated as the group's timing
/// authority, and the live connection it holds.
///
/// Informational only: position is always server-computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conductor {
    pub display_id: DbId,
    pub connection_id: ConnectionId,
}

/// Runtime state for one sync group.
///
/// Owned exclusively by the [`SyncRuntimeStore`](crate::store::SyncRuntimeStore)
/// and mutated only through its operations.
#[derive(Debug, Clone)]
pub struct GroupRuntime {
    pub id: DbId,
    pub name: String,
    /// Ordered membership; the order is the initial election order.
    pub members: Vec<DbId>,
    pub conductor: Option<Conductor>,
    pub content: Option<ContentRef>,
    /// Optional activity window gating the sync source in the resolver.
    pub window: Option<ScheduleWindow>,
    pub playback_state: PlaybackState,
    /// Frozen position; while Playing, wall time since `started_at` is
    /// added on top.
    pub position_secs: f64,
    /// When playback (re)started; `None` unless Playing.
    pub started_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl GroupRuntime {
    pub fn new(
        id: DbId,
        name: String,
        members: Vec<DbId>,
        content: Option<ContentRef>,
        window: Option<ScheduleWindow>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            members,
            conductor: None,
            content,
            window,
            playback_state: PlaybackState::Stopped,
            position_secs: 0.0,
            started_at: None,
            updated_at: now,
        }
    }

    /// Current playback position: the frozen position plus elapsed wall
    /// time while Playing.
    pub fn current_position(&self, now: Timestamp) -> f64 {
        match (self.playback_state, self.started_at) {
            (PlaybackState::Playing, Some(started)) => {
                let elapsed = (now - started).num_milliseconds() as f64 / 1000.0;
                self.position_secs + elapsed.max(0.0)
            }
            _ => self.position_secs,
        }
    }

    /// `Stopped -> Playing` with the given content and starting position.
    pub fn start(&mut self, content: ContentRef, position_secs: f64, now: Timestamp) -> bool {
        if self.playback_state != PlaybackState::Stopped {
            return false;
        }
        self.content = Some(content);
        self.position_secs = position_secs.max(0.0);
        self.playback_state = PlaybackState::Playing;
        self.started_at = Some(now);
        self.updated_at = now;
        true
    }

    /// `Playing -> Paused`, freezing the position.
    pub fn pause(&mut self, now: Timestamp) -> bool {
        if self.playback_state != PlaybackState::Playing {
            return false;
        }
        self.position_secs = self.current_position(now);
        self.playback_state = PlaybackState::Paused;
        self.started_at = None;
        self.updated_at = now;
        true
    }

    /// `Paused -> Playing`, resuming from the frozen position.
    pub fn resume(&mut self, now: Timestamp) -> bool {
        if self.playback_state != PlaybackState::Paused {
            return false;
        }
        self.playback_state = PlaybackState::Playing;
        self.started_at = Some(now);
        self.updated_at = now;
        true
    }

    /// Reposition without changing transport state. Valid while Playing or
    /// Paused.
    pub fn seek(&mut self, position_secs: f64, now: Timestamp) -> bool {
        match self.playback_state {
            PlaybackState::Playing => {
                self.position_secs = position_secs.max(0.0);
                self.started_at = Some(now);
            }
            PlaybackState::Paused => {
                self.position_secs = position_secs.max(0.0);
            }
            PlaybackState::Stopped => return false,
        }
        self.updated_at = now;
        true
    }

    /// `* -> Stopped`, resetting the position to 0.
    pub fn stop(&mut self, now: Timestamp) -> bool {
        self.playback_state = PlaybackState::Stopped;
        self.position_secs = 0.0;
        self.started_at = None;
        self.updated_at = now;
        true
    }
}
