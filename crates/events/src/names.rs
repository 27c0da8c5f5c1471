//! Well-known event type name constants.
//!
//! These are part of the wire contract with rendering clients; the
//! transport layer forwards them verbatim as message names.

/// Periodic playback position tick for a playing sync group.
pub const SYNC_TICK: &str = "sync:tick";

/// A sync group's membership, content, or transport state changed.
pub const SYNC_GROUP_UPDATED: &str = "sync:group-updated";

/// A sync group's conductor changed (election, failover, or manual).
pub const SYNC_CONDUCTOR_CHANGED: &str = "sync:conductor-changed";

/// A schedule became the winning schedule for a display.
pub const SCHEDULE_ACTIVATED: &str = "schedule:activated";

/// A display's winning schedule ended with no successor.
pub const SCHEDULE_ENDED: &str = "schedule:ended";

/// A display's winning schedule was replaced by a different one.
pub const SCHEDULE_CHANGED: &str = "schedule:changed";
