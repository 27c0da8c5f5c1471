//! Repository for the `playlist_entries` table.

use marquee_core::types::DbId;
use sqlx::PgPool;

use crate::models::PlaylistEntry;

/// Read access to display playlists.
pub struct PlaylistRepo;

impl PlaylistRepo {
    /// A display's playlist in order, joined with each entry's content URL
    /// and transcoding status. Readiness filtering is the caller's call.
    pub async fn list_for_display(
        pool: &PgPool,
        display_id: DbId,
    ) -> Result<Vec<PlaylistEntry>, sqlx::Error> {
        sqlx::query_as::<_, PlaylistEntry>(
            "SELECT p.display_id, p.content_id, p.position, c.url, c.status \
             FROM playlist_entries p \
             JOIN contents c ON c.id = p.content_id \
             WHERE p.display_id = $1 \
             ORDER BY p.position",
        )
        .bind(display_id)
        .fetch_all(pool)
        .await
    }
}
