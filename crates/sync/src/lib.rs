//! The sync engine: runtime group state, conductor election wiring, and
//! the server-driven tick broadcast.
//!
//! [`SyncRuntimeStore`] owns every sync group's in-memory state and the
//! live connection bindings. The real-time transport reports connection
//! lifecycle (`display_connected`, `display_disconnected`, `join_group`,
//! `leave_group`) and transport control (`start`, `pause`, `resume`,
//! `seek`, `stop`) into it; every observable change is published to the
//! event bus as a room-scoped event.
//!
//! Runtime state is deliberately not durable: a process restart brings
//! every group back stopped.

pub mod broadcaster;
pub mod error;
pub mod group;
pub mod store;

pub use broadcaster::{TickBroadcaster, TickPayload};
pub use error::SyncError;
pub use group::{Conductor, GroupRuntime, PlaybackState};
pub use store::{ConductorChange, ElectionReason, GroupSnapshot, SyncRuntimeStore};
