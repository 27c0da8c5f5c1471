//! The sync runtime store.
//!
//! One owned instance holds every group's runtime state plus the live
//! connection bindings, all behind a single coarse lock — contention is
//! low at fleet sizes of tens to low thousands of displays. Construct one
//! per process (or per test); share via `Arc`.
//!
//! Every observable mutation publishes a room-scoped event on the bus.
//! Events are collected while the lock is held and published after it is
//! released.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;

use marquee_core::content::ContentRef;
use marquee_core::election;
use marquee_core::schedule::ScheduleWindow;
use marquee_core::types::{ConnectionId, DbId, Timestamp};
use marquee_events::{names, DisplayEvent, EventBus, Room};

use crate::error::SyncError;
use crate::group::{Conductor, GroupRuntime, PlaybackState};

// ---------------------------------------------------------------------------
// Public event payload types
// ---------------------------------------------------------------------------

/// Why a conductor changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionReason {
    /// A conductor-less group gained one (connect, join, membership change).
    Elected,
    /// The previous conductor's connection was lost.
    Failover,
    /// An operator assigned the conductor explicitly.
    Manual,
}

/// Payload of a `sync:conductor-changed` event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConductorChange {
    pub group_id: DbId,
    pub old: Option<DbId>,
    pub new: Option<DbId>,
    pub reason: ElectionReason,
}

/// Read-only view of one group's runtime state.
///
/// `position_secs` is the live position at snapshot time, not the frozen
/// field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSnapshot {
    pub id: DbId,
    pub name: String,
    pub members: Vec<DbId>,
    pub conductor_id: Option<DbId>,
    pub content: Option<ContentRef>,
    pub window: Option<ScheduleWindow>,
    pub playback_state: PlaybackState,
    pub position_secs: f64,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// A live transport connection for a display.
#[derive(Debug, Clone)]
struct Connection {
    display_id: DbId,
    connected_at: Timestamp,
}

#[derive(Default)]
struct Inner {
    groups: HashMap<DbId, GroupRuntime>,
    /// display -> group membership index.
    display_group: HashMap<DbId, DbId>,
    /// Live transport connections by transport-assigned id.
    connections: HashMap<ConnectionId, Connection>,
}

impl Inner {
    /// Earliest connection timestamp per connected member of a group.
    fn connected_members(&self, group: &GroupRuntime) -> HashMap<DbId, Timestamp> {
        let mut map: HashMap<DbId, Timestamp> = HashMap::new();
        for conn in self.connections.values() {
            if !group.members.contains(&conn.display_id) {
                continue;
            }
            map.entry(conn.display_id)
                .and_modify(|at| {
                    if conn.connected_at < *at {
                        *at = conn.connected_at;
                    }
                })
                .or_insert(conn.connected_at);
        }
        map
    }

    /// A display's live connection (the earliest one, if several).
    fn connection_for(&self, display_id: DbId) -> Option<(&ConnectionId, &Connection)> {
        self.connections
            .iter()
            .filter(|(_, c)| c.display_id == display_id)
            .min_by_key(|(_, c)| c.connected_at)
    }
}

/// Which election policy to apply.
#[derive(Debug, Clone, Copy)]
enum Policy {
    /// Membership order (first connected member wins).
    Initial,
    /// Connection age (oldest surviving connection wins).
    Failover,
}

// ---------------------------------------------------------------------------
// SyncRuntimeStore
// ---------------------------------------------------------------------------

/// Owns all sync runtime state; see the module docs.
pub struct SyncRuntimeStore {
    inner: RwLock<Inner>,
    bus: Arc<EventBus>,
}

impl SyncRuntimeStore {
    /// Create an empty store publishing to the given bus.
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            bus,
        }
    }

    // -- group lifecycle ----------------------------------------------------

    /// Register (or replace) a group with the given ordered membership.
    ///
    /// Members already bound to another group are pulled out of it first —
    /// a display belongs to at most one group. If any member is already
    /// connected, an initial election runs immediately.
    pub async fn create_group(
        &self,
        group_id: DbId,
        name: String,
        members: Vec<DbId>,
        content: Option<ContentRef>,
        window: Option<ScheduleWindow>,
    ) {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            let now = Utc::now();
            for &display_id in &members {
                remove_membership(&mut inner, display_id, &mut events);
            }
            let group = GroupRuntime::new(group_id, name, members.clone(), content, window, now);
            inner.groups.insert(group_id, group);
            for &display_id in &members {
                inner.display_group.insert(display_id, group_id);
            }
            elect_conductor(
                &mut inner,
                group_id,
                Policy::Initial,
                ElectionReason::Elected,
                &mut events,
            );
            if let Some(group) = inner.groups.get(&group_id) {
                events.push(group_updated_event(&snapshot_of(group, now)));
            }
        }
        self.publish_all(events);
    }

    /// Replace a group's membership.
    ///
    /// Re-elects (membership-order policy) when the current conductor is
    /// no longer a member.
    pub async fn update_group(&self, group_id: DbId, members: Vec<DbId>) -> Result<(), SyncError> {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            let old_members = match inner.groups.get(&group_id) {
                Some(group) => group.members.clone(),
                None => return Err(SyncError::GroupNotFound(group_id)),
            };
            let now = Utc::now();
            for display_id in old_members.iter().copied() {
                if !members.contains(&display_id) {
                    inner.display_group.remove(&display_id);
                }
            }
            for &display_id in &members {
                if !old_members.contains(&display_id) {
                    remove_membership(&mut inner, display_id, &mut events);
                }
                inner.display_group.insert(display_id, group_id);
            }
            let conductor_removed = {
                let Some(group) = inner.groups.get_mut(&group_id) else {
                    return Err(SyncError::GroupNotFound(group_id));
                };
                group.members = members;
                group.updated_at = now;
                group
                    .conductor
                    .as_ref()
                    .is_some_and(|c| !group.members.contains(&c.display_id))
            };
            if conductor_removed {
                elect_conductor(
                    &mut inner,
                    group_id,
                    Policy::Initial,
                    ElectionReason::Elected,
                    &mut events,
                );
            }
            if let Some(group) = inner.groups.get(&group_id) {
                events.push(group_updated_event(&snapshot_of(group, now)));
            }
        }
        self.publish_all(events);
        Ok(())
    }

    /// Remove a group and all of its bindings.
    pub async fn delete_group(&self, group_id: DbId) -> Result<(), SyncError> {
        let mut inner = self.inner.write().await;
        let Some(group) = inner.groups.remove(&group_id) else {
            return Err(SyncError::GroupNotFound(group_id));
        };
        for display_id in group.members {
            inner.display_group.remove(&display_id);
        }
        Ok(())
    }

    // -- connection lifecycle -----------------------------------------------

    /// A display's transport connection came up.
    ///
    /// If the display's group has no conductor, it is elected on the spot
    /// (first connected member in membership order).
    pub async fn display_connected(&self, connection_id: ConnectionId, display_id: DbId) {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            inner.connections.insert(
                connection_id,
                Connection {
                    display_id,
                    connected_at: Utc::now(),
                },
            );
            if let Some(&group_id) = inner.display_group.get(&display_id) {
                let needs_conductor = inner
                    .groups
                    .get(&group_id)
                    .is_some_and(|g| g.conductor.is_none());
                if needs_conductor {
                    elect_conductor(
                        &mut inner,
                        group_id,
                        Policy::Initial,
                        ElectionReason::Elected,
                        &mut events,
                    );
                }
            }
        }
        self.publish_all(events);
    }

    /// A display's transport connection dropped.
    ///
    /// If it was the conductor's connection, failover promotes the member
    /// with the oldest surviving connection. A group left with no
    /// connected member keeps no conductor and, if Playing, is forced to
    /// Paused — never stopped — so the position survives.
    pub async fn display_disconnected(&self, connection_id: &str) {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            let Some(conn) = inner.connections.remove(connection_id) else {
                tracing::debug!(connection_id, "Disconnect for unknown connection ignored");
                return;
            };
            if let Some(&group_id) = inner.display_group.get(&conn.display_id) {
                let was_conductor = inner
                    .groups
                    .get(&group_id)
                    .and_then(|g| g.conductor.as_ref())
                    .is_some_and(|c| c.connection_id == connection_id);
                if was_conductor {
                    elect_conductor(
                        &mut inner,
                        group_id,
                        Policy::Failover,
                        ElectionReason::Failover,
                        &mut events,
                    );
                }
            }
        }
        self.publish_all(events);
    }

    /// A connected display asks to join a group.
    ///
    /// Pulls the display out of any previous group first; a display
    /// belongs to at most one group at a time.
    pub async fn join_group(
        &self,
        connection_id: &str,
        group_id: DbId,
        display_id: DbId,
    ) -> Result<(), SyncError> {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            if !inner.connections.contains_key(connection_id) {
                return Err(SyncError::UnknownConnection(connection_id.to_string()));
            }
            if !inner.groups.contains_key(&group_id) {
                return Err(SyncError::GroupNotFound(group_id));
            }
            if inner.display_group.get(&display_id) == Some(&group_id) {
                return Ok(());
            }
            remove_membership(&mut inner, display_id, &mut events);
            let now = Utc::now();
            if let Some(group) = inner.groups.get_mut(&group_id) {
                if !group.members.contains(&display_id) {
                    group.members.push(display_id);
                }
                group.updated_at = now;
            }
            inner.display_group.insert(display_id, group_id);
            let needs_conductor = inner
                .groups
                .get(&group_id)
                .is_some_and(|g| g.conductor.is_none());
            if needs_conductor {
                elect_conductor(
                    &mut inner,
                    group_id,
                    Policy::Initial,
                    ElectionReason::Elected,
                    &mut events,
                );
            }
            if let Some(group) = inner.groups.get(&group_id) {
                events.push(group_updated_event(&snapshot_of(group, now)));
            }
        }
        self.publish_all(events);
        Ok(())
    }

    /// A connected display asks to leave its group.
    pub async fn leave_group(&self, connection_id: &str, display_id: DbId) -> Result<(), SyncError> {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            if !inner.connections.contains_key(connection_id) {
                return Err(SyncError::UnknownConnection(connection_id.to_string()));
            }
            if !inner.display_group.contains_key(&display_id) {
                return Err(SyncError::DisplayNotInGroup(display_id));
            }
            remove_membership(&mut inner, display_id, &mut events);
        }
        self.publish_all(events);
        Ok(())
    }

    /// Manually assign a group's conductor. The display must be a member
    /// with a live connection.
    pub async fn set_conductor(&self, group_id: DbId, display_id: DbId) -> Result<(), SyncError> {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            let (is_member, old) = {
                let Some(group) = inner.groups.get(&group_id) else {
                    return Err(SyncError::GroupNotFound(group_id));
                };
                (
                    group.members.contains(&display_id),
                    group.conductor.as_ref().map(|c| c.display_id),
                )
            };
            if !is_member {
                return Err(SyncError::NotAMember {
                    group_id,
                    display_id,
                });
            }
            if old == Some(display_id) {
                return Ok(());
            }
            let connection_id = inner
                .connection_for(display_id)
                .map(|(id, _)| id.clone())
                .ok_or(SyncError::DisplayNotConnected(display_id))?;
            let now = Utc::now();
            if let Some(group) = inner.groups.get_mut(&group_id) {
                group.conductor = Some(Conductor {
                    display_id,
                    connection_id,
                });
                group.updated_at = now;
            }
            events.push(conductor_changed_event(ConductorChange {
                group_id,
                old,
                new: Some(display_id),
                reason: ElectionReason::Manual,
            }));
        }
        self.publish_all(events);
        Ok(())
    }

    // -- transport control --------------------------------------------------

    /// `Stopped -> Playing` with the given content and position. Returns
    /// whether the transition applied.
    pub async fn start(
        &self,
        group_id: DbId,
        content: ContentRef,
        position_secs: f64,
    ) -> Result<bool, SyncError> {
        self.transition(group_id, move |g, now| g.start(content, position_secs, now))
            .await
    }

    /// `Playing -> Paused`, freezing the position.
    pub async fn pause(&self, group_id: DbId) -> Result<bool, SyncError> {
        self.transition(group_id, |g, now| g.pause(now)).await
    }

    /// `Paused -> Playing`.
    pub async fn resume(&self, group_id: DbId) -> Result<bool, SyncError> {
        self.transition(group_id, |g, now| g.resume(now)).await
    }

    /// Reposition while Playing or Paused.
    pub async fn seek(&self, group_id: DbId, position_secs: f64) -> Result<bool, SyncError> {
        self.transition(group_id, move |g, now| g.seek(position_secs, now))
            .await
    }

    /// `* -> Stopped`, resetting the position.
    pub async fn stop(&self, group_id: DbId) -> Result<bool, SyncError> {
        self.transition(group_id, |g, now| g.stop(now)).await
    }

    async fn transition<F>(&self, group_id: DbId, apply: F) -> Result<bool, SyncError>
    where
        F: FnOnce(&mut GroupRuntime, Timestamp) -> bool,
    {
        let mut events = Vec::new();
        let applied;
        {
            let mut inner = self.inner.write().await;
            let now = Utc::now();
            let Some(group) = inner.groups.get_mut(&group_id) else {
                return Err(SyncError::GroupNotFound(group_id));
            };
            applied = apply(group, now);
            if applied {
                events.push(group_updated_event(&snapshot_of(group, now)));
            } else {
                tracing::debug!(
                    group_id,
                    state = ?group.playback_state,
                    "Transport transition ignored in current state"
                );
            }
        }
        self.publish_all(events);
        Ok(applied)
    }

    // -- reads --------------------------------------------------------------

    /// The group's current playback position in seconds.
    pub async fn current_time(&self, group_id: DbId) -> Result<f64, SyncError> {
        let inner = self.inner.read().await;
        inner
            .groups
            .get(&group_id)
            .map(|g| g.current_position(Utc::now()))
            .ok_or(SyncError::GroupNotFound(group_id))
    }

    /// Snapshot of one group.
    pub async fn snapshot(&self, group_id: DbId) -> Result<GroupSnapshot, SyncError> {
        let inner = self.inner.read().await;
        let now = Utc::now();
        inner
            .groups
            .get(&group_id)
            .map(|g| snapshot_of(g, now))
            .ok_or(SyncError::GroupNotFound(group_id))
    }

    /// Snapshots of every group, ordered by id.
    pub async fn snapshots(&self) -> Vec<GroupSnapshot> {
        let inner = self.inner.read().await;
        let now = Utc::now();
        let mut out: Vec<GroupSnapshot> = inner.groups.values().map(|g| snapshot_of(g, now)).collect();
        out.sort_by_key(|s| s.id);
        out
    }

    /// Snapshot of the group a display belongs to, if any.
    pub async fn group_for_display(&self, display_id: DbId) -> Option<GroupSnapshot> {
        let inner = self.inner.read().await;
        let group_id = inner.display_group.get(&display_id)?;
        let now = Utc::now();
        inner.groups.get(group_id).map(|g| snapshot_of(g, now))
    }

    /// Snapshots of every currently Playing group, for the tick loop.
    pub async fn playing_snapshots(&self) -> Vec<GroupSnapshot> {
        let inner = self.inner.read().await;
        let now = Utc::now();
        let mut out: Vec<GroupSnapshot> = inner
            .groups
            .values()
            .filter(|g| g.playback_state == PlaybackState::Playing)
            .map(|g| snapshot_of(g, now))
            .collect();
        out.sort_by_key(|s| s.id);
        out
    }

    /// Number of live transport connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    fn publish_all(&self, events: Vec<DisplayEvent>) {
        for event in events {
            self.bus.publish(event);
        }
    }
}

// ---------------------------------------------------------------------------
// Locked helpers
// ---------------------------------------------------------------------------

/// Run an election for `group_id` and record the outcome.
///
/// No-op when the winner equals the current conductor. When no member is
/// connected the group loses its conductor and, if Playing, is forced to
/// Paused so the position survives.
fn elect_conductor(
    inner: &mut Inner,
    group_id: DbId,
    policy: Policy,
    reason: ElectionReason,
    events: &mut Vec<DisplayEvent>,
) {
    let (candidate, old) = {
        let Some(group) = inner.groups.get(&group_id) else {
            return;
        };
        let connected = inner.connected_members(group);
        let candidate = match policy {
            Policy::Initial => election::initial_conductor(&group.members, &connected),
            Policy::Failover => election::failover_conductor(&group.members, &connected),
        };
        (candidate, group.conductor.as_ref().map(|c| c.display_id))
    };
    if candidate == old {
        return;
    }
    let new_conductor = candidate.and_then(|display_id| {
        inner.connection_for(display_id).map(|(conn_id, _)| Conductor {
            display_id,
            connection_id: conn_id.clone(),
        })
    });
    let now = Utc::now();
    let Some(group) = inner.groups.get_mut(&group_id) else {
        return;
    };
    group.conductor = new_conductor;
    group.updated_at = now;
    if group.conductor.is_none() && group.playback_state == PlaybackState::Playing {
        group.pause(now);
        events.push(group_updated_event(&snapshot_of(group, now)));
    }
    events.push(conductor_changed_event(ConductorChange {
        group_id,
        old,
        new: candidate,
        reason,
    }));
}

/// Remove a display from whatever group it belongs to, re-electing if it
/// was the conductor.
fn remove_membership(inner: &mut Inner, display_id: DbId, events: &mut Vec<DisplayEvent>) {
    let Some(group_id) = inner.display_group.remove(&display_id) else {
        return;
    };
    let now = Utc::now();
    let was_conductor = {
        let Some(group) = inner.groups.get_mut(&group_id) else {
            return;
        };
        group.members.retain(|m| *m != display_id);
        group.updated_at = now;
        group
            .conductor
            .as_ref()
            .is_some_and(|c| c.display_id == display_id)
    };
    if was_conductor {
        elect_conductor(
            inner,
            group_id,
            Policy::Initial,
            ElectionReason::Elected,
            events,
        );
    }
    if let Some(group) = inner.groups.get(&group_id) {
        events.push(group_updated_event(&snapshot_of(group, now)));
    }
}

fn snapshot_of(group: &GroupRuntime, now: Timestamp) -> GroupSnapshot {
    GroupSnapshot {
        id: group.id,
        name: group.name.clone(),
        members: group.members.clone(),
        conductor_id: group.conductor.as_ref().map(|c| c.display_id),
        content: group.content.clone(),
        window: group.window.clone(),
        playback_state: group.playback_state,
        position_secs: group.current_position(now),
        updated_at: group.updated_at,
    }
}

fn group_updated_event(snapshot: &GroupSnapshot) -> DisplayEvent {
    DisplayEvent::new(names::SYNC_GROUP_UPDATED, Room::Group(snapshot.id))
        .with_payload(json!(snapshot))
}

fn conductor_changed_event(change: ConductorChange) -> DisplayEvent {
    DisplayEvent::new(names::SYNC_CONDUCTOR_CHANGED, Room::Group(change.group_id))
        .with_payload(json!(change))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn content() -> ContentRef {
        ContentRef {
            id: 9,
            url: "https://cdn.example/sync.mp4".to_string(),
        }
    }

    fn new_store() -> (SyncRuntimeStore, broadcast::Receiver<DisplayEvent>) {
        let bus = Arc::new(EventBus::default());
        let rx = bus.subscribe();
        (SyncRuntimeStore::new(bus), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<DisplayEvent>) -> Vec<DisplayEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    fn conductor_changes(events: &[DisplayEvent]) -> Vec<&DisplayEvent> {
        events
            .iter()
            .filter(|e| e.event_type == names::SYNC_CONDUCTOR_CHANGED)
            .collect()
    }

    #[tokio::test]
    async fn first_connected_member_becomes_conductor() {
        let (store, mut rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![1, 2, 3], Some(content()), None)
            .await;
        store.display_connected("c-2".into(), 2).await;

        assert_eq!(store.snapshot(1).await.unwrap().conductor_id, Some(2));

        let events = drain(&mut rx);
        let changes = conductor_changes(&events);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].payload["reason"], "elected");
        assert_eq!(changes[0].payload["new"], 2);
        assert!(changes[0].payload["old"].is_null());
    }

    #[tokio::test]
    async fn failover_promotes_oldest_surviving_connection_exactly_once() {
        // Membership order [1, 3, 2]; connect order 1, 2, 3. Failover must
        // pick 2 (oldest surviving connection), not 3 (membership order).
        let (store, mut rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![1, 3, 2], Some(content()), None)
            .await;
        store.display_connected("c-1".into(), 1).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        store.display_connected("c-2".into(), 2).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        store.display_connected("c-3".into(), 3).await;

        assert_eq!(store.snapshot(1).await.unwrap().conductor_id, Some(1));
        drain(&mut rx);

        store.display_disconnected("c-1").await;

        assert_eq!(store.snapshot(1).await.unwrap().conductor_id, Some(2));
        let events = drain(&mut rx);
        let changes = conductor_changes(&events);
        assert_eq!(changes.len(), 1, "failover must fire exactly once");
        assert_eq!(changes[0].payload["reason"], "failover");
        assert_eq!(changes[0].payload["old"], 1);
        assert_eq!(changes[0].payload["new"], 2);
    }

    #[tokio::test]
    async fn losing_every_connection_forces_pause_not_stop() {
        let (store, mut rx) = new_store();
        store
            .create_group(1, "bar".into(), vec![7], Some(content()), None)
            .await;
        store.display_connected("c-7".into(), 7).await;
        store.start(1, content(), 10.0).await.unwrap();
        drain(&mut rx);

        store.display_disconnected("c-7").await;

        let snap = store.snapshot(1).await.unwrap();
        assert_eq!(snap.conductor_id, None);
        assert_eq!(snap.playback_state, PlaybackState::Paused);
        assert!(
            (snap.position_secs - 10.0).abs() < 1.0,
            "position must survive the forced pause"
        );

        let events = drain(&mut rx);
        let changes = conductor_changes(&events);
        assert_eq!(changes.len(), 1);
        assert!(changes[0].payload["new"].is_null());
        let paused_update = events.iter().any(|e| {
            e.event_type == names::SYNC_GROUP_UPDATED && e.payload["playbackState"] == "paused"
        });
        assert!(paused_update, "the forced pause must be broadcast");
    }

    #[tokio::test]
    async fn stale_requests_are_errors_not_panics() {
        let (store, _rx) = new_store();
        store.display_connected("c-1".into(), 1).await;

        assert_matches!(
            store.join_group("c-1", 99, 1).await,
            Err(SyncError::GroupNotFound(99))
        );
        assert_matches!(
            store.leave_group("c-1", 1).await,
            Err(SyncError::DisplayNotInGroup(1))
        );
        assert_matches!(
            store.join_group("c-ghost", 99, 1).await,
            Err(SyncError::UnknownConnection(_))
        );
        assert_matches!(
            store.pause(42).await,
            Err(SyncError::GroupNotFound(42))
        );
        // Unknown connection disconnect is silently ignored.
        store.display_disconnected("c-ghost").await;
    }

    #[tokio::test]
    async fn display_belongs_to_at_most_one_group() {
        let (store, _rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![5], Some(content()), None)
            .await;
        store
            .create_group(2, "bar".into(), vec![], Some(content()), None)
            .await;
        store.display_connected("c-5".into(), 5).await;

        store.join_group("c-5", 2, 5).await.unwrap();

        assert!(store.snapshot(1).await.unwrap().members.is_empty());
        assert_eq!(store.snapshot(2).await.unwrap().members, vec![5]);
        assert_eq!(store.group_for_display(5).await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn transport_transitions_publish_group_updates() {
        let (store, mut rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![1], Some(content()), None)
            .await;
        drain(&mut rx);

        assert!(store.start(1, content(), 0.0).await.unwrap());
        assert!(store.pause(1).await.unwrap());
        assert!(store.resume(1).await.unwrap());
        assert!(store.seek(1, 30.0).await.unwrap());
        assert!(store.stop(1).await.unwrap());
        // Invalid in current state: ignored, not an error.
        assert!(!store.pause(1).await.unwrap());

        let events = drain(&mut rx);
        let states: Vec<_> = events
            .iter()
            .filter(|e| e.event_type == names::SYNC_GROUP_UPDATED)
            .map(|e| e.payload["playbackState"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            states,
            vec!["playing", "paused", "playing", "playing", "stopped"]
        );
    }

    #[tokio::test]
    async fn current_time_is_frozen_while_paused() {
        let (store, _rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![1], Some(content()), None)
            .await;
        store.start(1, content(), 10.0).await.unwrap();
        store.pause(1).await.unwrap();

        let first = store.current_time(1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = store.current_time(1).await.unwrap();
        assert_eq!(first, second);
        assert!((first - 10.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn removing_the_conductor_from_membership_reelects() {
        let (store, mut rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![1, 2], Some(content()), None)
            .await;
        store.display_connected("c-1".into(), 1).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        store.display_connected("c-2".into(), 2).await;
        assert_eq!(store.snapshot(1).await.unwrap().conductor_id, Some(1));
        drain(&mut rx);

        store.update_group(1, vec![2]).await.unwrap();

        assert_eq!(store.snapshot(1).await.unwrap().conductor_id, Some(2));
        assert!(store.group_for_display(1).await.is_none());
        let events = drain(&mut rx);
        let changes = conductor_changes(&events);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].payload["reason"], "elected");
    }

    #[tokio::test]
    async fn manual_conductor_assignment_requires_connected_member() {
        let (store, mut rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![1, 2], Some(content()), None)
            .await;
        store.display_connected("c-1".into(), 1).await;
        store.display_connected("c-2".into(), 2).await;
        drain(&mut rx);

        store.set_conductor(1, 2).await.unwrap();
        let events = drain(&mut rx);
        let changes = conductor_changes(&events);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].payload["reason"], "manual");

        assert_matches!(
            store.set_conductor(1, 99).await,
            Err(SyncError::NotAMember { .. })
        );
        store.display_disconnected("c-1").await;
        assert_matches!(
            store.set_conductor(1, 1).await,
            Err(SyncError::DisplayNotConnected(1))
        );
    }

    #[tokio::test]
    async fn deleting_a_group_clears_bindings() {
        let (store, _rx) = new_store();
        store
            .create_group(1, "lobby".into(), vec![4], Some(content()), None)
            .await;
        store.delete_group(1).await.unwrap();
        assert!(store.group_for_display(4).await.is_none());
        assert_matches!(store.snapshot(1).await, Err(SyncError::GroupNotFound(1)));
    }
}
