//! Playlist entry model.

use marquee_core::content::ContentRef;
use marquee_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use super::content::STATUS_READY;

/// One row of a display's ordered playlist, joined with its content
/// item's URL and status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistEntry {
    pub display_id: DbId,
    pub content_id: DbId,
    pub position: i32,
    pub url: String,
    pub status: String,
}

impl PlaylistEntry {
    /// Only entries whose content finished transcoding are playable.
    pub fn is_ready(&self) -> bool {
        self.status == STATUS_READY
    }

    pub fn content_ref(&self) -> ContentRef {
        ContentRef {
            id: self.content_id,
            url: self.url.clone(),
        }
    }
}
