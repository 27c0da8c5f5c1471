//! Pure domain logic for the marquee display platform.
//!
//! This crate has zero internal dependencies and performs no I/O: it holds
//! the shared id/timestamp types, the recurrence and schedule evaluators,
//! the resolver's output model, and the conductor election policies. The
//! runtime store, resolver, and query surface all build on it.

pub mod content;
pub mod election;
pub mod recurrence;
pub mod schedule;
pub mod types;
