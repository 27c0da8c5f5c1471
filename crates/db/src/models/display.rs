//! Display entity model.

use marquee_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `displays` table: one physical screen.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Display {
    pub id: DbId,
    pub hotel_id: DbId,
    /// Optional placement within a hotel area; scopes alerts and schedules.
    pub area_id: Option<DbId>,
    pub name: String,
    /// Content shown when nothing else in the cascade applies.
    pub fallback_content_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
