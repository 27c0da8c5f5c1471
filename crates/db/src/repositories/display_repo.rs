//! Repository for the `displays` table.

use marquee_core::types::DbId;
use sqlx::PgPool;

use crate::models::Display;

/// Column list for `displays` queries.
const COLUMNS: &str =
    "id, hotel_id, area_id, name, fallback_content_id, created_at, updated_at";

/// Read access to displays.
pub struct DisplayRepo;

impl DisplayRepo {
    /// Fetch a single display.
    pub async fn get(pool: &PgPool, display_id: DbId) -> Result<Option<Display>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM displays WHERE id = $1");
        sqlx::query_as::<_, Display>(&query)
            .bind(display_id)
            .fetch_optional(pool)
            .await
    }

    /// All display ids, for sweep-style iteration.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM displays ORDER BY id")
            .fetch_all(pool)
            .await
    }
}
