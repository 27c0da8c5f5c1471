//! Minute-cadence schedule transition watcher.
//!
//! Re-evaluates every display's winning schedule on a fixed interval —
//! independent of the tick loop — and publishes an event to the display's
//! room when the winner differs from the previous sweep: `activated` when
//! a display gains a winner, `ended` when it loses one, `changed` when one
//! winner replaces another.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde_json::json;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use marquee_core::types::DbId;
use marquee_db::models::Schedule;
use marquee_events::{names, DisplayEvent, EventBus, Room};

use crate::catalog::ContentCatalog;
use crate::resolve::{ContentResolver, ResolveError};

/// Default sweep cadence.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Background service that watches for schedule transitions.
pub struct ScheduleChecker {
    resolver: Arc<ContentResolver>,
    catalog: Arc<dyn ContentCatalog>,
    bus: Arc<EventBus>,
    interval: Duration,
    /// Previous sweep's winning schedule per display.
    winners: Mutex<HashMap<DbId, DbId>>,
}

impl ScheduleChecker {
    /// Create a checker with the default 60 s cadence.
    pub fn new(
        resolver: Arc<ContentResolver>,
        catalog: Arc<dyn ContentCatalog>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self::with_interval(resolver, catalog, bus, DEFAULT_CHECK_INTERVAL)
    }

    /// Create a checker with a specific cadence.
    pub fn with_interval(
        resolver: Arc<ContentResolver>,
        catalog: Arc<dyn ContentCatalog>,
        bus: Arc<EventBus>,
        interval: Duration,
    ) -> Self {
        Self {
            resolver,
            catalog,
            bus,
            interval,
            winners: Mutex::new(HashMap::new()),
        }
    }

    /// Run the sweep loop.
    ///
    /// A failed sweep is logged and the loop continues; the loop exits
    /// gracefully when the provided [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Schedule checker cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = self.sweep().await {
                        tracing::error!(error = %err, "Schedule sweep failed");
                    }
                }
            }
        }
    }

    async fn sweep(&self) -> Result<(), ResolveError> {
        self.sweep_at(Local::now().naive_local()).await
    }

    /// One sweep over all displays against an explicit wall clock.
    async fn sweep_at(&self, wall: NaiveDateTime) -> Result<(), ResolveError> {
        let display_ids = self.catalog.display_ids().await?;
        for display_id in display_ids {
            match self.resolver.winning_schedule_at(display_id, wall).await {
                Ok(winner) => self.apply_transition(display_id, winner.as_ref()).await,
                Err(err) => {
                    tracing::warn!(
                        display_id,
                        error = %err,
                        "Schedule sweep failed for display"
                    );
                }
            }
        }
        Ok(())
    }

    /// Compare against the previous winner and publish the transition, if
    /// any.
    async fn apply_transition(&self, display_id: DbId, winner: Option<&Schedule>) {
        let old = {
            let mut winners = self.winners.lock().await;
            let old = winners.get(&display_id).copied();
            match winner {
                Some(schedule) => winners.insert(display_id, schedule.id),
                None => winners.remove(&display_id),
            };
            old
        };
        let new = winner.map(|s| s.id);
        if old == new {
            return;
        }

        let event = match (old, winner) {
            (None, Some(schedule)) => {
                DisplayEvent::new(names::SCHEDULE_ACTIVATED, Room::Display(display_id))
                    .with_payload(json!({
                        "scheduleId": schedule.id,
                        "contentId": schedule.content_id,
                    }))
            }
            (Some(old_id), None) => {
                DisplayEvent::new(names::SCHEDULE_ENDED, Room::Display(display_id))
                    .with_payload(json!({ "scheduleId": old_id }))
            }
            (Some(old_id), Some(schedule)) => {
                DisplayEvent::new(names::SCHEDULE_CHANGED, Room::Display(display_id))
                    .with_payload(json!({
                        "previousScheduleId": old_id,
                        "scheduleId": schedule.id,
                        "contentId": schedule.content_id,
                    }))
            }
            (None, None) => return,
        };
        self.bus.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fixtures, MemoryCatalog};
    use chrono::NaiveDate;
    use marquee_sync::SyncRuntimeStore;
    use tokio::sync::broadcast;

    const HOTEL: DbId = 1;
    const DISPLAY: DbId = 10;

    fn wall() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn drain(rx: &mut broadcast::Receiver<DisplayEvent>) -> Vec<DisplayEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    fn setup() -> (
        Arc<MemoryCatalog>,
        ScheduleChecker,
        broadcast::Receiver<DisplayEvent>,
    ) {
        let catalog = Arc::new(MemoryCatalog::default());
        catalog.insert_display(fixtures::display(DISPLAY, HOTEL, None, None));
        let bus = Arc::new(EventBus::default());
        let rx = bus.subscribe();
        let sync = Arc::new(SyncRuntimeStore::new(Arc::clone(&bus)));
        let resolver = Arc::new(ContentResolver::new(
            Arc::clone(&catalog) as Arc<dyn ContentCatalog>,
            sync,
        ));
        let checker = ScheduleChecker::new(
            resolver,
            Arc::clone(&catalog) as Arc<dyn ContentCatalog>,
            bus,
        );
        (catalog, checker, rx)
    }

    #[tokio::test]
    async fn emits_activated_ended_and_changed_transitions() {
        let (catalog, checker, mut rx) = setup();
        catalog.insert_content(fixtures::ready_content(101, HOTEL));
        catalog.insert_content(fixtures::ready_content(102, HOTEL));
        catalog.insert_schedule(fixtures::schedule(2, HOTEL, 101, 3));

        // First sweep: display gains a winner.
        checker.sweep_at(wall()).await.unwrap();
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, names::SCHEDULE_ACTIVATED);
        assert_eq!(events[0].room, Room::Display(DISPLAY));
        assert_eq!(events[0].payload["scheduleId"], 2);

        // Same winner: silence.
        checker.sweep_at(wall()).await.unwrap();
        assert!(drain(&mut rx).is_empty());

        // A higher-priority schedule takes over.
        catalog.insert_schedule(fixtures::schedule(3, HOTEL, 102, 9));
        checker.sweep_at(wall()).await.unwrap();
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, names::SCHEDULE_CHANGED);
        assert_eq!(events[0].payload["previousScheduleId"], 2);
        assert_eq!(events[0].payload["scheduleId"], 3);

        // All schedules gone: the winner ends.
        catalog.clear_schedules();
        checker.sweep_at(wall()).await.unwrap();
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, names::SCHEDULE_ENDED);
        assert_eq!(events[0].payload["scheduleId"], 3);
    }

    #[tokio::test]
    async fn displays_without_schedules_stay_silent() {
        let (_catalog, checker, mut rx) = setup();
        checker.sweep_at(wall()).await.unwrap();
        checker.sweep_at(wall()).await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn catalog_failure_aborts_the_sweep_without_panicking() {
        let (catalog, checker, mut rx) = setup();
        catalog.set_failing(true);
        assert!(checker.sweep_at(wall()).await.is_err());
        assert!(drain(&mut rx).is_empty());
    }
}
