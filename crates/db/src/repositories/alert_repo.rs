//! Repository for the `alerts` table.

use marquee_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::Alert;

/// Column list for `alerts` queries.
const COLUMNS: &str = "id, hotel_id, display_id, area_id, is_active, starts_at, ends_at, \
     priority, content_id, created_at, updated_at";

/// Read access to alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Alerts for a hotel that are active and time-window-current at `now`,
    /// highest priority first, ties broken by most recent creation.
    ///
    /// Scope filtering (display/area/hotel-wide) happens in the caller via
    /// [`Alert::applies_to`] so the rules stay unit-testable.
    pub async fn list_current(
        pool: &PgPool,
        hotel_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE hotel_id = $1 \
               AND is_active = TRUE \
               AND starts_at <= $2 \
               AND (ends_at IS NULL OR ends_at > $2) \
             ORDER BY priority DESC, created_at DESC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(hotel_id)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}
