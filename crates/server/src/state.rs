use std::sync::Arc;

use marquee_resolver::ContentResolver;
use marquee_sync::SyncRuntimeStore;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable — inner data is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: marquee_db::DbPool,
    /// Content resolver answering "what should display X show".
    pub resolver: Arc<ContentResolver>,
    /// Sync runtime store (groups, conductors, positions).
    pub sync: Arc<SyncRuntimeStore>,
}
