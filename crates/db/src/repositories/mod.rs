//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async read methods
//! that accept `&PgPool` as the first argument. The core never writes
//! these tables; mutation belongs to the administrative layer.

pub mod alert_repo;
pub mod content_repo;
pub mod display_repo;
pub mod playlist_repo;
pub mod schedule_repo;
pub mod sync_group_repo;

pub use alert_repo::AlertRepo;
pub use content_repo::ContentRepo;
pub use display_repo::DisplayRepo;
pub use playlist_repo::PlaylistRepo;
pub use schedule_repo::ScheduleRepo;
pub use sync_group_repo::SyncGroupRepo;
