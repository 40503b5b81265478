use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{TrackingQuery, TrackingView},
    repo,
};
use crate::{
    auth::AuthUser,
    clock::today_for,
    errors::{bad_request, internal, ApiError},
    state::AppState,
};

pub fn tracking_routes() -> Router<AppState> {
    Router::new().route("/tracking", get(get_tracking))
}

#[instrument(skip(state))]
pub async fn get_tracking(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<TrackingQuery>,
) -> Result<Json<TrackingView>, ApiError> {
    let today = today_for(q.utc_offset_minutes, state.config.default_utc_offset_minutes)
        .map_err(bad_request)?;
    let current = repo::get(&state.db, user_id).await.map_err(internal)?;
    Ok(Json(TrackingView::new(&current, current.log_day(today))))
}
