//! Read-side persistence surface for resolution.
//!
//! The resolver only ever reads; this trait is the whole of its view of
//! the database. The pool's acquire timeout bounds every call, so a
//! resolution can fail loudly instead of hanging.

use async_trait::async_trait;

use marquee_core::types::{DbId, Timestamp};
use marquee_db::models::{Alert, ContentItem, Display, PlaylistEntry, Schedule};
use marquee_db::repositories::{
    AlertRepo, ContentRepo, DisplayRepo, PlaylistRepo, ScheduleRepo,
};
use marquee_db::DbPool;

/// Error from catalog reads.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The backing store could not be reached or timed out.
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Everything the resolver and schedule checker read.
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// A display with its scoping context, or `None` when unknown.
    async fn display(&self, display_id: DbId) -> Result<Option<Display>, CatalogError>;

    /// All display ids, for sweep-style iteration.
    async fn display_ids(&self) -> Result<Vec<DbId>, CatalogError>;

    /// Alerts for a hotel that are active and time-window-current at
    /// `now`, highest priority first, ties most-recent-created first.
    async fn current_alerts(
        &self,
        hotel_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<Alert>, CatalogError>;

    /// Active schedules for a hotel, priority-descending with a
    /// deterministic id tie-break.
    async fn active_schedules(&self, hotel_id: DbId) -> Result<Vec<Schedule>, CatalogError>;

    /// A display's ordered playlist entries, joined with content status.
    async fn playlist(&self, display_id: DbId) -> Result<Vec<PlaylistEntry>, CatalogError>;

    /// A content item by id.
    async fn content(&self, content_id: DbId) -> Result<Option<ContentItem>, CatalogError>;
}

/// Postgres-backed catalog delegating to the repository layer.
pub struct PgCatalog {
    pool: DbPool,
}

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentCatalog for PgCatalog {
    async fn display(&self, display_id: DbId) -> Result<Option<Display>, CatalogError> {
        Ok(DisplayRepo::get(&self.pool, display_id).await?)
    }

    async fn display_ids(&self) -> Result<Vec<DbId>, CatalogError> {
        Ok(DisplayRepo::list_ids(&self.pool).await?)
    }

    async fn current_alerts(
        &self,
        hotel_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<Alert>, CatalogError> {
        Ok(AlertRepo::list_current(&self.pool, hotel_id, now).await?)
    }

    async fn active_schedules(&self, hotel_id: DbId) -> Result<Vec<Schedule>, CatalogError> {
        Ok(ScheduleRepo::list_active(&self.pool, hotel_id).await?)
    }

    async fn playlist(&self, display_id: DbId) -> Result<Vec<PlaylistEntry>, CatalogError> {
        Ok(PlaylistRepo::list_for_display(&self.pool, display_id).await?)
    }

    async fn content(&self, content_id: DbId) -> Result<Option<ContentItem>, CatalogError> {
        Ok(ContentRepo::get(&self.pool, content_id).await?)
    }
}
