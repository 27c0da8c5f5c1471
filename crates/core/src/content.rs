//! The resolver's output model: the single content source a display must
//! show right now.
//!
//! The payload shape is part of the wire contract with rendering clients:
//! every kind carries the same field set, so consumers handle one shape
//! and switch on `kind`.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Base priority reported for alert sources; the alert's own priority is
/// added on top.
pub const PRIORITY_ALERT_BASE: i32 = 1000;

/// Priority reported for an actively playing sync group.
pub const PRIORITY_SYNC: i32 = 500;

/// Base priority reported for schedule sources; the schedule's own
/// priority is added on top.
pub const PRIORITY_SCHEDULE_BASE: i32 = 100;

/// Priority reported for a display's static playlist.
pub const PRIORITY_PLAYLIST: i32 = 0;

/// Priority reported for configured fallback content.
pub const PRIORITY_FALLBACK: i32 = -1;

/// Priority reported when no content is assigned at all.
pub const PRIORITY_NONE: i32 = -1;

/// Which arm of the priority cascade produced a resolution.
///
/// Precedence between kinds is the cascade order (alert, sync, schedule,
/// playlist, fallback, none); the numeric priority only ranks candidates
/// within the alert and schedule arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSourceKind {
    Alert,
    Sync,
    Schedule,
    Playlist,
    Fallback,
    None,
}

/// Pointer to a playable content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRef {
    pub id: DbId,
    pub url: String,
}

/// The resolver's answer for one display at one instant.
///
/// Never persisted — recomputed on demand. `content` is the item to show
/// now; `playlist` carries the ordered list when the winning source is a
/// playlist, and is empty otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSource {
    pub kind: ContentSourceKind,
    pub priority: i32,
    /// Serialized as `contentRef`: that name is the wire contract with
    /// rendering clients.
    #[serde(rename = "contentRef")]
    pub content: Option<ContentRef>,
    pub playlist: Vec<ContentRef>,
    /// Human-readable justification for why this source won.
    pub reason: String,
}

impl ContentSource {
    /// The empty resolution: nothing assigned, nothing shown.
    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            kind: ContentSourceKind::None,
            priority: PRIORITY_NONE,
            content: None,
            playlist: Vec::new(),
            reason: reason.into(),
        }
    }
}
