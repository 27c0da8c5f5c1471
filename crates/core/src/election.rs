//! Conductor election policies.
//!
//! Initial election and failover intentionally use different orderings:
//! the first election walks the group's membership order, while failover
//! after a conductor loss promotes the member whose connection has
//! survived the longest. Which physical screen becomes the timing
//! authority after a crash is observable product behavior, so the two
//! policies are kept distinct rather than unified.

use std::collections::HashMap;

use crate::types::{DbId, Timestamp};

/// First connected member in membership order.
///
/// Used when a group gains its first conductor: on group creation, on the
/// first member connect, or on join.
pub fn initial_conductor(
    members: &[DbId],
    connected: &HashMap<DbId, Timestamp>,
) -> Option<DbId> {
    members.iter().copied().find(|m| connected.contains_key(m))
}

/// Oldest-connected surviving member.
///
/// Used when the current conductor disconnects. Connection-time ties fall
/// back to membership order so the result is deterministic.
pub fn failover_conductor(
    members: &[DbId],
    connected: &HashMap<DbId, Timestamp>,
) -> Option<DbId> {
    members
        .iter()
        .enumerate()
        .filter_map(|(index, member)| connected.get(member).map(|at| (*at, index, *member)))
        .min_by_key(|(at, index, _)| (*at, *index))
        .map(|(_, _, member)| member)
}
