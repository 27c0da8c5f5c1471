//! Entity models.
//!
//! Plain `FromRow` structs mirroring the tables the core reads, plus the
//! small scoping/eligibility helpers the resolver leans on.

pub mod alert;
pub mod content;
pub mod display;
pub mod playlist;
pub mod schedule;
pub mod sync_group;

pub use alert::Alert;
pub use content::ContentItem;
pub use display::Display;
pub use playlist::PlaylistEntry;
pub use schedule::Schedule;
pub use sync_group::SyncGroupConfig;
