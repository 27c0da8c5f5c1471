use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};

use marquee_core::types::DbId;
use marquee_sync::GroupSnapshot;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /sync-groups -- runtime snapshots of every group.
async fn list_groups(State(state): State<AppState>) -> Json<Vec<GroupSnapshot>> {
    Json(state.sync.snapshots().await)
}

/// GET /sync-groups/{group_id} -- runtime snapshot of one group, with its
/// live playback position.
async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<GroupSnapshot>> {
    state
        .sync
        .snapshot(group_id)
        .await
        .map(Json)
        .map_err(|_| AppError::NotFound {
            entity: "sync group",
            id: group_id,
        })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync-groups", get(list_groups))
        .route("/sync-groups/{group_id}", get(get_group))
}
