//! Repository for the `contents` table.

use marquee_core::types::DbId;
use sqlx::PgPool;

use crate::models::ContentItem;

/// Column list for `contents` queries.
const COLUMNS: &str = "id, hotel_id, name, url, status, created_at, updated_at";

/// Read access to content items.
pub struct ContentRepo;

impl ContentRepo {
    /// Fetch a single content item.
    pub async fn get(pool: &PgPool, content_id: DbId) -> Result<Option<ContentItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contents WHERE id = $1");
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(content_id)
            .fetch_optional(pool)
            .await
    }
}
