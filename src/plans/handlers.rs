use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    calendar::{build_calendar, CalendarWindow, PlanEntry, Window},
    dto::{CalendarQuery, CreatePlanEntryRequest},
    repo,
};
use crate::{
    auth::AuthUser,
    clock::today_for,
    errors::{bad_request, internal, ApiError},
    profile,
    state::AppState,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/meal-plan", get(get_calendar).post(create_entry))
}

/// Meal plans sit behind the subscription paywall.
async fn require_premium(state: &AppState, user_id: Uuid) -> Result<(), ApiError> {
    if profile::repo::is_premium(&state.db, user_id)
        .await
        .map_err(internal)?
    {
        Ok(())
    } else {
        info!(%user_id, "meal plan blocked by paywall");
        Err((
            StatusCode::PAYMENT_REQUIRED,
            "Premium subscription required".into(),
        ))
    }
}

/// GET /meal-plan?date=YYYY-MM-DD&days=N
#[instrument(skip(state))]
pub async fn get_calendar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<CalendarQuery>,
) -> Result<Json<CalendarWindow>, ApiError> {
    let start = match q.date {
        Some(d) => d,
        None => today_for(q.utc_offset_minutes, state.config.default_utc_offset_minutes)
            .map_err(bad_request)?,
    };
    let window = Window::new(start, q.days).map_err(bad_request)?;

    require_premium(&state, user_id).await?;

    let entries = repo::list_window(&state.db, user_id, window)
        .await
        .map_err(internal)?;
    Ok(Json(build_calendar(window, entries)))
}

#[instrument(skip(state, body))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreatePlanEntryRequest>,
) -> Result<(StatusCode, Json<PlanEntry>), ApiError> {
    body.validate().map_err(bad_request)?;
    require_premium(&state, user_id).await?;

    let entry = repo::insert(&state.db, user_id, &body)
        .await
        .map_err(internal)?;
    info!(%user_id, entry_id = %entry.id, date = %entry.plan_date, "meal plan entry added");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::build_app, auth::jwt::JwtKeys};
    use axum::extract::FromRef;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use axum_test::TestServer;

    // Checked before the paywall lookup, so no database is needed.
    #[tokio::test]
    async fn window_past_the_calendar_is_rejected() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let server = TestServer::new(build_app(state)).unwrap();
        let res = server
            .get("/api/v1/meal-plan")
            .add_query_param("date", "9999-12-30")
            .add_query_param("days", 7)
            .add_header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            )
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        assert!(res.text().contains("outside the calendar"));
    }
}
