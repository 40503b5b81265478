use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{LogMealRequest, LogMealResponse, Pagination},
    repo::{self, Meal},
    services::log_meal,
};
use crate::{
    auth::AuthUser,
    clock::today_for,
    errors::{bad_request, internal, ApiError},
    state::AppState,
    tracking::dto::TrackingView,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal).delete(delete_meal))
}

/// POST /meals
#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<LogMealResponse>), ApiError> {
    body.validate().map_err(bad_request)?;
    let today = today_for(body.utc_offset_minutes, state.config.default_utc_offset_minutes)
        .map_err(bad_request)?;

    let logged = log_meal(&state.db, user_id, &body, today)
        .await
        .map_err(internal)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/meals/{}", logged.meal.id)) {
        headers.insert(LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(LogMealResponse {
            tracking: TrackingView::new(&logged.tracking, logged.day),
            meal: logged.meal,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let (limit, offset) = p.clamped();
    let meals = repo::list_by_user(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Meal>, ApiError> {
    repo::get(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".into()))
}

/// Removes the meal only; streak and daily count are left as they are.
#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if repo::delete(&state.db, user_id, id).await.map_err(internal)? {
        info!(%user_id, meal_id = %id, "meal deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Meal not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::build_app, auth::jwt::JwtKeys};
    use axum::extract::FromRef;
    use axum::http::header::AUTHORIZATION;
    use axum_test::TestServer;
    use serde_json::json;

    fn server() -> (TestServer, HeaderValue) {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();
        (TestServer::new(build_app(state)).unwrap(), bearer)
    }

    // Rejected before any database access.
    #[tokio::test]
    async fn invalid_meal_is_rejected() {
        let (server, bearer) = server();
        let res = server
            .post("/api/v1/meals")
            .add_header(AUTHORIZATION, bearer.clone())
            .json(&json!({ "food_name": "Toast", "calories": -10 }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);

        let res = server
            .post("/api/v1/meals")
            .add_header(AUTHORIZATION, bearer)
            .json(&json!({ "food_name": "Toast", "utc_offset_minutes": 5000 }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn meals_require_auth() {
        let (server, _) = server();
        server
            .get("/api/v1/meals")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
