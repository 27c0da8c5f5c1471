//! Content resolution: the priority cascade deciding what each display
//! shows, and the minute-cadence schedule transition watcher.
//!
//! All persistence reads go through the [`ContentCatalog`] trait so the
//! cascade is testable against an in-memory catalog; the Postgres-backed
//! [`PgCatalog`] is the production implementation.

pub mod catalog;
pub mod checker;
pub mod resolve;

pub use catalog::{CatalogError, ContentCatalog, PgCatalog};
pub use checker::ScheduleChecker;
pub use resolve::{ContentResolver, ResolveError};

#[cfg(test)]
mod testutil;
