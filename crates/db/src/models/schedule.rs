//! Schedule entity model.

use chrono::{NaiveDate, NaiveTime};
use marquee_core::schedule::ScheduleWindow;
use marquee_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `schedules` table: time-windowed content with an
/// optional recurrence rule.
///
/// Scoped to at most one of display/area (enforced by a table CHECK);
/// neither means the schedule is a hotel-wide default.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Schedule {
    pub id: DbId,
    pub hotel_id: DbId,
    pub display_id: Option<DbId>,
    pub area_id: Option<DbId>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// RFC 5545 RRULE text; `None` means one-time.
    pub recurrence: Option<String>,
    pub priority: i32,
    pub is_active: bool,
    pub content_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Schedule {
    /// The pure evaluation window for this schedule.
    pub fn window(&self) -> ScheduleWindow {
        ScheduleWindow {
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: self.start_time,
            end_time: self.end_time,
            recurrence: self.recurrence.clone(),
        }
    }

    /// Whether this schedule targets the given display; same scoping rules
    /// as alerts.
    pub fn applies_to(&self, display_id: DbId, area_id: Option<DbId>) -> bool {
        match (self.display_id, self.area_id) {
            (Some(scoped), _) => scoped == display_id,
            (None, Some(scoped)) => area_id == Some(scoped),
            (None, None) => true,
        }
    }
}
