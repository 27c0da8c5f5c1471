//! Alert entity model.

use marquee_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `alerts` table: emergency or priority content that
/// preempts everything else on the displays it targets.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub hotel_id: DbId,
    /// Scope to a single display. Takes precedence over `area_id`.
    pub display_id: Option<DbId>,
    /// Scope to a single area; only consulted when `display_id` is unset.
    pub area_id: Option<DbId>,
    pub is_active: bool,
    pub starts_at: Timestamp,
    /// `None` means the alert never expires by time, only by
    /// `is_active = false`.
    pub ends_at: Option<Timestamp>,
    pub priority: i32,
    pub content_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Alert {
    /// Whether the alert is active and inside its `[starts_at, ends_at)`
    /// window at `now`.
    pub fn is_current(&self, now: Timestamp) -> bool {
        self.is_active && self.starts_at <= now && self.ends_at.is_none_or(|end| now < end)
    }

    /// Whether this alert targets the given display: display scope wins,
    /// else area scope (only when the alert has no display scope), else
    /// hotel-wide.
    pub fn applies_to(&self, display_id: DbId, area_id: Option<DbId>) -> bool {
        match (self.display_id, self.area_id) {
            (Some(scoped), _) => scoped == display_id,
            (None, Some(scoped)) => area_id == Some(scoped),
            (None, None) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn base() -> Alert {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Alert {
            id: 1,
            hotel_id: 1,
            display_id: None,
            area_id: None,
            is_active: true,
            starts_at: start,
            ends_at: None,
            priority: 0,
            content_id: 1,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn open_ended_alert_never_expires_by_time() {
        let alert = base();
        let far_future = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert!(alert.is_current(far_future));
    }

    #[test]
    fn window_is_half_open() {
        let mut alert = base();
        let end = alert.starts_at + Duration::hours(1);
        alert.ends_at = Some(end);
        assert!(alert.is_current(alert.starts_at));
        assert!(alert.is_current(end - Duration::seconds(1)));
        assert!(!alert.is_current(end));
    }

    #[test]
    fn inactive_alert_is_never_current() {
        let mut alert = base();
        alert.is_active = false;
        assert!(!alert.is_current(alert.starts_at));
    }

    #[test]
    fn display_scope_overrides_area_scope() {
        let mut alert = base();
        alert.display_id = Some(5);
        alert.area_id = Some(9);
        assert!(alert.applies_to(5, None));
        // Matching area is not enough when the alert targets a display.
        assert!(!alert.applies_to(6, Some(9)));
    }

    #[test]
    fn area_scope_matches_only_that_area() {
        let mut alert = base();
        alert.area_id = Some(9);
        assert!(alert.applies_to(5, Some(9)));
        assert!(!alert.applies_to(5, Some(10)));
        assert!(!alert.applies_to(5, None));
    }

    #[test]
    fn unscoped_alert_is_hotel_wide() {
        let alert = base();
        assert!(alert.applies_to(5, None));
        assert!(alert.applies_to(6, Some(2)));
    }
}
