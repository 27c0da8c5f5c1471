//! Repository for the `schedules` table.

use marquee_core::types::DbId;
use sqlx::PgPool;

use crate::models::Schedule;

/// Column list for `schedules` queries.
const COLUMNS: &str = "id, hotel_id, display_id, area_id, start_date, end_date, start_time, \
     end_time, recurrence, priority, is_active, content_id, created_at, updated_at";

/// Read access to schedules.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Fetch a single schedule.
    pub async fn get(pool: &PgPool, schedule_id: DbId) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1");
        sqlx::query_as::<_, Schedule>(&query)
            .bind(schedule_id)
            .fetch_optional(pool)
            .await
    }

    /// Active schedules for a hotel, priority-descending with a
    /// deterministic id tie-break. Activity *now* (date range, time
    /// window, recurrence) is evaluated by the caller.
    pub async fn list_active(pool: &PgPool, hotel_id: DbId) -> Result<Vec<Schedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedules \
             WHERE hotel_id = $1 AND is_active = TRUE \
             ORDER BY priority DESC, id"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(hotel_id)
            .fetch_all(pool)
            .await
    }
}
