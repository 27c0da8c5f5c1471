//! Marquee event infrastructure.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DisplayEvent`] — the room-addressed event envelope. The real-time
//!   transport subscribes once and forwards each event to the sockets
//!   joined to its room; in-process consumers subscribe the same way.
//! - [`names`] — well-known event type constants.

pub mod bus;
pub mod names;

pub use bus::{DisplayEvent, EventBus, Room};
