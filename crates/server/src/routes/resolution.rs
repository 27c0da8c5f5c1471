use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};

use marquee_core::content::ContentSource;
use marquee_core::types::DbId;
use marquee_resolver::ResolveError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /displays/{display_id}/resolution -- the winning content source for
/// a display right now.
///
/// A persistence failure degrades to the explicit empty source (`kind:
/// none`, `reason: "resolution error"`) rather than guessing; only an
/// unknown display is a 404.
async fn get_resolution(
    State(state): State<AppState>,
    Path(display_id): Path<DbId>,
) -> AppResult<Json<ContentSource>> {
    match state.resolver.resolve(display_id).await {
        Ok(source) => Ok(Json(source)),
        Err(ResolveError::UnknownDisplay(id)) => Err(AppError::NotFound {
            entity: "display",
            id,
        }),
        Err(err) => {
            tracing::error!(display_id, error = %err, "Resolution failed");
            Ok(Json(ContentSource::none("resolution error")))
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/displays/{display_id}/resolution", get(get_resolution))
}
