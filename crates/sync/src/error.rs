//! Sync engine error type.
//!
//! None of these are fatal: requests referencing stale state are logged by
//! the transport-facing caller and ignored.

use marquee_core::types::{ConnectionId, DbId};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The referenced group does not exist (deleted or never created).
    #[error("sync group {0} not found")]
    GroupNotFound(DbId),

    /// The display is not a member of the referenced group.
    #[error("display {display_id} is not a member of sync group {group_id}")]
    NotAMember { group_id: DbId, display_id: DbId },

    /// The display is not in any sync group.
    #[error("display {0} is not in any sync group")]
    DisplayNotInGroup(DbId),

    /// The connection was never registered or is already torn down.
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    /// The display has no live connection (e.g. manual conductor
    /// assignment to an offline display).
    #[error("display {0} has no live connection")]
    DisplayNotConnected(DbId),
}
