//! Content entity model.

use marquee_core::content::ContentRef;
use marquee_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Content still being transcoded; not yet playable.
pub const STATUS_PROCESSING: &str = "processing";

/// Content with a playable URL. Only ready content is eligible for
/// playlists.
pub const STATUS_READY: &str = "ready";

/// Transcoding failed; never playable.
pub const STATUS_FAILED: &str = "failed";

/// A row from the `contents` table.
///
/// The transcoding pipeline owns the `status` column; this layer only
/// reads it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentItem {
    pub id: DbId,
    pub hotel_id: DbId,
    pub name: String,
    pub url: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentItem {
    pub fn is_ready(&self) -> bool {
        self.status == STATUS_READY
    }

    /// The playable pointer handed to rendering clients.
    pub fn content_ref(&self) -> ContentRef {
        ContentRef {
            id: self.id,
            url: self.url.clone(),
        }
    }
}
