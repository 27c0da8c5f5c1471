//! In-memory [`ContentCatalog`] and entity fixtures for resolver tests.

use std::sync::Mutex;

use async_trait::async_trait;

use marquee_core::types::{DbId, Timestamp};
use marquee_db::models::{Alert, ContentItem, Display, PlaylistEntry, Schedule};

use crate::catalog::{CatalogError, ContentCatalog};

#[derive(Default)]
struct State {
    displays: Vec<Display>,
    alerts: Vec<Alert>,
    schedules: Vec<Schedule>,
    playlists: Vec<PlaylistEntry>,
    contents: Vec<ContentItem>,
    failing: bool,
}

/// An in-memory catalog mirroring the repository layer's query semantics
/// (ordering, joins), with a switch to simulate persistence failure.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    pub fn insert_display(&self, display: Display) {
        self.state.lock().unwrap().displays.push(display);
    }

    pub fn insert_alert(&self, alert: Alert) {
        self.state.lock().unwrap().alerts.push(alert);
    }

    pub fn insert_schedule(&self, schedule: Schedule) {
        self.state.lock().unwrap().schedules.push(schedule);
    }

    pub fn clear_schedules(&self) {
        self.state.lock().unwrap().schedules.clear();
    }

    pub fn insert_playlist_entry(&self, entry: PlaylistEntry) {
        self.state.lock().unwrap().playlists.push(entry);
    }

    pub fn insert_content(&self, content: ContentItem) {
        self.state.lock().unwrap().contents.push(content);
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    fn check(&self, state: &State) -> Result<(), CatalogError> {
        if state.failing {
            Err(CatalogError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentCatalog for MemoryCatalog {
    async fn display(&self, display_id: DbId) -> Result<Option<Display>, CatalogError> {
        let state = self.state.lock().unwrap();
        self.check(&state)?;
        Ok(state.displays.iter().find(|d| d.id == display_id).cloned())
    }

    async fn display_ids(&self) -> Result<Vec<DbId>, CatalogError> {
        let state = self.state.lock().unwrap();
        self.check(&state)?;
        let mut ids: Vec<DbId> = state.displays.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn current_alerts(
        &self,
        hotel_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<Alert>, CatalogError> {
        let state = self.state.lock().unwrap();
        self.check(&state)?;
        let mut alerts: Vec<Alert> = state
            .alerts
            .iter()
            .filter(|a| a.hotel_id == hotel_id && a.is_current(now))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(alerts)
    }

    async fn active_schedules(&self, hotel_id: DbId) -> Result<Vec<Schedule>, CatalogError> {
        let state = self.state.lock().unwrap();
        self.check(&state)?;
        let mut schedules: Vec<Schedule> = state
            .schedules
            .iter()
            .filter(|s| s.hotel_id == hotel_id && s.is_active)
            .cloned()
            .collect();
        schedules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        Ok(schedules)
    }

    async fn playlist(&self, display_id: DbId) -> Result<Vec<PlaylistEntry>, CatalogError> {
        let state = self.state.lock().unwrap();
        self.check(&state)?;
        let mut entries: Vec<PlaylistEntry> = state
            .playlists
            .iter()
            .filter(|e| e.display_id == display_id)
            .map(|e| {
                let mut joined = e.clone();
                if let Some(content) = state.contents.iter().find(|c| c.id == e.content_id) {
                    joined.url = content.url.clone();
                    joined.status = content.status.clone();
                }
                joined
            })
            .collect();
        entries.sort_by_key(|e| e.position);
        Ok(entries)
    }

    async fn content(&self, content_id: DbId) -> Result<Option<ContentItem>, CatalogError> {
        let state = self.state.lock().unwrap();
        self.check(&state)?;
        Ok(state.contents.iter().find(|c| c.id == content_id).cloned())
    }
}

/// Entity builders with sensible test defaults.
pub mod fixtures {
    use chrono::{NaiveDate, NaiveTime, Utc};
    use marquee_core::schedule::ScheduleWindow;
    use marquee_core::types::{DbId, Timestamp};
    use marquee_db::models::content::{STATUS_PROCESSING, STATUS_READY};
    use marquee_db::models::{Alert, ContentItem, Display, PlaylistEntry, Schedule};

    pub fn display(
        id: DbId,
        hotel_id: DbId,
        area_id: Option<DbId>,
        fallback_content_id: Option<DbId>,
    ) -> Display {
        Display {
            id,
            hotel_id,
            area_id,
            name: format!("display-{id}"),
            fallback_content_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn content(id: DbId, hotel_id: DbId, status: &str) -> ContentItem {
        ContentItem {
            id,
            hotel_id,
            name: format!("content-{id}"),
            url: format!("https://cdn.example/{id}.mp4"),
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn ready_content(id: DbId, hotel_id: DbId) -> ContentItem {
        content(id, hotel_id, STATUS_READY)
    }

    pub fn processing_content(id: DbId, hotel_id: DbId) -> ContentItem {
        content(id, hotel_id, STATUS_PROCESSING)
    }

    /// A hotel-wide, open-ended alert whose window opened at `created_at`.
    pub fn alert(
        id: DbId,
        hotel_id: DbId,
        content_id: DbId,
        priority: i32,
        created_at: Timestamp,
    ) -> Alert {
        Alert {
            id,
            hotel_id,
            display_id: None,
            area_id: None,
            is_active: true,
            starts_at: created_at,
            ends_at: None,
            priority,
            content_id,
            created_at,
            updated_at: created_at,
        }
    }

    /// A hotel-wide all-day schedule with no recurrence, active from
    /// 2025-01-01.
    pub fn schedule(id: DbId, hotel_id: DbId, content_id: DbId, priority: i32) -> Schedule {
        Schedule {
            id,
            hotel_id,
            display_id: None,
            area_id: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            start_time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
            recurrence: None,
            priority,
            is_active: true,
            content_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn playlist_entry(display_id: DbId, content_id: DbId, position: i32) -> PlaylistEntry {
        PlaylistEntry {
            display_id,
            content_id,
            position,
            // Filled by the catalog's join at query time.
            url: String::new(),
            status: String::new(),
        }
    }

    /// A schedule window covering the given daily time range, every day
    /// from 2025-01-01.
    pub fn window(start: &str, end: &str) -> ScheduleWindow {
        ScheduleWindow {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            start_time: NaiveTime::parse_from_str(start, "%H:%M:%S").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M:%S").unwrap(),
            recurrence: None,
        }
    }
}
