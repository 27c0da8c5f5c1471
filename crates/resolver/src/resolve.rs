//! The priority cascade: decide what one display must show right now.
//!
//! Sources are checked in strict order — alert, sync, schedule, playlist,
//! fallback — and the first match wins. The whole pass is read-only and
//! idempotent, safe to call at arbitrarily high frequency; it is invoked
//! both on demand (query surface) and from the periodic schedule checker.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Utc};

use marquee_core::content::{
    ContentSource, ContentSourceKind, PRIORITY_ALERT_BASE, PRIORITY_FALLBACK,
    PRIORITY_PLAYLIST, PRIORITY_SCHEDULE_BASE, PRIORITY_SYNC,
};
use marquee_core::schedule;
use marquee_core::types::{DbId, Timestamp};
use marquee_db::models::{Display, Schedule};
use marquee_sync::{PlaybackState, SyncRuntimeStore};

use crate::catalog::{CatalogError, ContentCatalog};

/// Error from a resolution pass.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The display id references no known display.
    #[error("display {0} not found")]
    UnknownDisplay(DbId),

    /// A persistence read failed; the resolution is aborted rather than
    /// answered partially or from stale data.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Resolves the winning content source for displays.
pub struct ContentResolver {
    catalog: Arc<dyn ContentCatalog>,
    sync: Arc<SyncRuntimeStore>,
}

impl ContentResolver {
    pub fn new(catalog: Arc<dyn ContentCatalog>, sync: Arc<SyncRuntimeStore>) -> Self {
        Self { catalog, sync }
    }

    /// Resolve the winning content source for a display.
    ///
    /// Idempotent: two calls with no intervening state change return
    /// identical answers.
    pub async fn resolve(&self, display_id: DbId) -> Result<ContentSource, ResolveError> {
        self.resolve_at(display_id, Utc::now(), Local::now().naive_local())
            .await
    }

    /// Transport-facing adapter: log the failure and degrade to an
    /// explicit empty source instead of guessing.
    pub async fn resolve_or_none(&self, display_id: DbId) -> ContentSource {
        match self.resolve(display_id).await {
            Ok(source) => source,
            Err(err) => {
                tracing::error!(display_id, error = %err, "Resolution failed");
                ContentSource::none("resolution error")
            }
        }
    }

    /// Resolution against explicit clocks: `now` for alert windows, `wall`
    /// for hotel-local schedule evaluation.
    pub async fn resolve_at(
        &self,
        display_id: DbId,
        now: Timestamp,
        wall: NaiveDateTime,
    ) -> Result<ContentSource, ResolveError> {
        let display = self
            .catalog
            .display(display_id)
            .await?
            .ok_or(ResolveError::UnknownDisplay(display_id))?;

        if let Some(source) = self.check_alerts(&display, now).await? {
            return Ok(source);
        }
        if let Some(source) = self.check_sync(&display, wall).await {
            return Ok(source);
        }
        if let Some(source) = self.check_schedules(&display, wall).await? {
            return Ok(source);
        }
        if let Some(source) = self.check_playlist(&display).await? {
            return Ok(source);
        }
        if let Some(source) = self.check_fallback(&display).await? {
            return Ok(source);
        }
        Ok(ContentSource::none("no content assigned"))
    }

    /// The schedule currently winning for a display, ignoring
    /// higher-priority sources. Drives the schedule checker's transition
    /// events.
    pub async fn winning_schedule_at(
        &self,
        display_id: DbId,
        wall: NaiveDateTime,
    ) -> Result<Option<Schedule>, ResolveError> {
        let display = self
            .catalog
            .display(display_id)
            .await?
            .ok_or(ResolveError::UnknownDisplay(display_id))?;
        self.winning_schedule_for(&display, wall).await
    }

    // -- cascade arms -------------------------------------------------------

    /// Highest-priority applicable alert, ties broken by most recent
    /// creation (the catalog orders them that way).
    async fn check_alerts(
        &self,
        display: &Display,
        now: Timestamp,
    ) -> Result<Option<ContentSource>, ResolveError> {
        let alerts = self.catalog.current_alerts(display.hotel_id, now).await?;
        for alert in alerts
            .iter()
            .filter(|a| a.applies_to(display.id, display.area_id))
        {
            let Some(item) = self.catalog.content(alert.content_id).await? else {
                tracing::warn!(alert_id = alert.id, "Alert content missing; skipping");
                continue;
            };
            return Ok(Some(ContentSource {
                kind: ContentSourceKind::Alert,
                priority: PRIORITY_ALERT_BASE + alert.priority,
                content: Some(item.content_ref()),
                playlist: Vec::new(),
                reason: format!("alert {} is active (priority {})", alert.id, alert.priority),
            }));
        }
        Ok(None)
    }

    /// The display's sync group, when it is actually Playing and — if the
    /// group carries a schedule window — that window is currently active.
    /// Paused, stopped, or out-of-window groups never win.
    async fn check_sync(&self, display: &Display, wall: NaiveDateTime) -> Option<ContentSource> {
        let snapshot = self.sync.group_for_display(display.id).await?;
        if snapshot.playback_state != PlaybackState::Playing {
            return None;
        }
        if let Some(window) = &snapshot.window {
            if !schedule::is_active_at(window, wall) {
                return None;
            }
        }
        let content = snapshot.content.clone()?;
        Some(ContentSource {
            kind: ContentSourceKind::Sync,
            priority: PRIORITY_SYNC,
            content: Some(content),
            playlist: Vec::new(),
            reason: format!(
                "sync group {} ({}) is playing",
                snapshot.id, snapshot.name
            ),
        })
    }

    async fn check_schedules(
        &self,
        display: &Display,
        wall: NaiveDateTime,
    ) -> Result<Option<ContentSource>, ResolveError> {
        let Some(winner) = self.winning_schedule_for(display, wall).await? else {
            return Ok(None);
        };
        let Some(item) = self.catalog.content(winner.content_id).await? else {
            tracing::warn!(schedule_id = winner.id, "Schedule content missing");
            return Ok(None);
        };
        Ok(Some(ContentSource {
            kind: ContentSourceKind::Schedule,
            priority: PRIORITY_SCHEDULE_BASE + winner.priority,
            content: Some(item.content_ref()),
            playlist: Vec::new(),
            reason: format!(
                "schedule {} is active (priority {})",
                winner.id, winner.priority
            ),
        }))
    }

    async fn winning_schedule_for(
        &self,
        display: &Display,
        wall: NaiveDateTime,
    ) -> Result<Option<Schedule>, ResolveError> {
        let mut schedules = self.catalog.active_schedules(display.hotel_id).await?;
        schedules.retain(|s| s.applies_to(display.id, display.area_id));
        // Deterministic evaluation order: priority descending, then id.
        schedules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        for candidate in schedules {
            match schedule::evaluate(&candidate.window(), wall) {
                Ok(true) => return Ok(Some(candidate)),
                Ok(false) => {}
                Err(err) => {
                    // Fail closed: a malformed rule hides content, never
                    // shows it at the wrong time.
                    tracing::warn!(
                        schedule_id = candidate.id,
                        error = %err,
                        "Malformed recurrence rule; schedule treated as inactive"
                    );
                }
            }
        }
        Ok(None)
    }

    /// The display's static playlist, restricted to entries whose content
    /// finished transcoding. The full ordered list rides along so
    /// rendering clients receive one shape regardless of source kind.
    async fn check_playlist(&self, display: &Display) -> Result<Option<ContentSource>, ResolveError> {
        let entries = self.catalog.playlist(display.id).await?;
        let ready: Vec<_> = entries
            .iter()
            .filter(|e| e.is_ready())
            .map(|e| e.content_ref())
            .collect();
        let Some(first) = ready.first().cloned() else {
            return Ok(None);
        };
        let count = ready.len();
        Ok(Some(ContentSource {
            kind: ContentSourceKind::Playlist,
            priority: PRIORITY_PLAYLIST,
            content: Some(first),
            playlist: ready,
            reason: format!("playlist with {count} ready item(s)"),
        }))
    }

    async fn check_fallback(&self, display: &Display) -> Result<Option<ContentSource>, ResolveError> {
        let Some(content_id) = display.fallback_content_id else {
            return Ok(None);
        };
        let Some(item) = self.catalog.content(content_id).await? else {
            let display_id = display.id;
            tracing::warn!(display_id, content_id, "Fallback content missing");
            return Ok(None);
        };
        Ok(Some(ContentSource {
            kind: ContentSourceKind::Fallback,
            priority: PRIORITY_FALLBACK,
            content: Some(item.content_ref()),
            playlist: Vec::new(),
            reason: "configured fallback content".to_string(),
        }))
    }
}
