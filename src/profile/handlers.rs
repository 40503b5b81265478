use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use super::{
    dto::OnboardingRequest,
    repo::{self, Profile},
    services::validate_onboarding,
};
use crate::{
    auth::AuthUser,
    clock::today_for,
    errors::{bad_request, internal, ApiError},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, ApiError> {
    repo::get(&state.db, user_id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Onboarding not completed".into()))
}

#[instrument(skip(state, body))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<OnboardingRequest>,
) -> Result<Json<Profile>, ApiError> {
    let today = today_for(body.utc_offset_minutes, state.config.default_utc_offset_minutes)
        .map_err(bad_request)?;
    let onboarding = validate_onboarding(body, today).map_err(bad_request)?;
    let profile = repo::upsert(&state.db, user_id, &onboarding)
        .await
        .map_err(internal)?;
    info!(%user_id, "profile saved");
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::build_app, auth::jwt::JwtKeys};
    use axum::extract::FromRef;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;

    fn server() -> (TestServer, HeaderValue) {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();
        (TestServer::new(build_app(state)).unwrap(), bearer)
    }

    #[tokio::test]
    async fn birth_date_is_checked_in_client_time() {
        let (server, bearer) = server();
        let res = server
            .put("/api/v1/profile")
            .add_header(AUTHORIZATION, bearer.clone())
            .json(&json!({ "date_of_birth": "1990-01-01", "utc_offset_minutes": 5000 }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert!(res.text().contains("utc offset"));

        let tomorrow = today_for(Some(840), 0).unwrap().next_day().unwrap();
        let res = server
            .put("/api/v1/profile")
            .add_header(AUTHORIZATION, bearer)
            .json(&json!({ "date_of_birth": tomorrow.to_string(), "utc_offset_minutes": 840 }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
    }
}
