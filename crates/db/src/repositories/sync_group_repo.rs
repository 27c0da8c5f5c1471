//! Repository for the `sync_groups` and `sync_group_members` tables.

use marquee_core::types::DbId;
use sqlx::PgPool;

use crate::models::SyncGroupConfig;

/// Column list for `sync_groups` queries.
const COLUMNS: &str = "id, hotel_id, name, content_id, schedule_id, created_at, updated_at";

/// Read access to sync group configuration.
pub struct SyncGroupRepo;

impl SyncGroupRepo {
    /// All configured groups, for startup hydration.
    pub async fn list(pool: &PgPool) -> Result<Vec<SyncGroupConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sync_groups ORDER BY id");
        sqlx::query_as::<_, SyncGroupConfig>(&query)
            .fetch_all(pool)
            .await
    }

    /// A group's member display ids in membership order. The order matters:
    /// it is the initial conductor election order.
    pub async fn members(pool: &PgPool, group_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT display_id FROM sync_group_members \
             WHERE group_id = $1 \
             ORDER BY position",
        )
        .bind(group_id)
        .fetch_all(pool)
        .await
    }
}
