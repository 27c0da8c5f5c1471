//! Sync group configuration model.
//!
//! This is the persisted definition of a group. Its runtime counterpart
//! (playback state, conductor, live position) lives in the sync crate's
//! store and is rebuilt — stopped — from these rows on startup.

use marquee_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sync_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SyncGroupConfig {
    pub id: DbId,
    pub hotel_id: DbId,
    pub name: String,
    /// Default content to play when the group is started.
    pub content_id: Option<DbId>,
    /// Optional schedule whose window gates the group in the resolver.
    pub schedule_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
