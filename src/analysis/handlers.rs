use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AnalysisFailure, AnalysisResponse, AnalyzeBase64Request},
    services::{analyze_photo, AnalysisError},
};
use crate::{auth::AuthUser, state::AppState};

/// Room for a phone photo, also after base64 inflation.
const UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

type Failure = (StatusCode, Json<AnalysisFailure>);

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/analysis", post(analyze_multipart))
        .route("/analysis/base64", post(analyze_base64))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
}

fn client_error(msg: impl ToString) -> Failure {
    (
        StatusCode::BAD_REQUEST,
        Json(AnalysisFailure {
            error: msg.to_string(),
            retryable: false,
        }),
    )
}

/// Keeps axum's status for broken uploads (413 once the body limit is hit).
fn upload_error(e: MultipartError) -> Failure {
    (
        e.status(),
        Json(AnalysisFailure {
            error: e.body_text(),
            retryable: false,
        }),
    )
}

async fn run(
    state: &AppState,
    user_id: Uuid,
    photo: Bytes,
    content_type: &str,
) -> Result<Json<AnalysisResponse>, Failure> {
    match analyze_photo(state.vision.as_ref(), photo, content_type).await {
        Ok(nutrition) => Ok(Json(AnalysisResponse { nutrition })),
        Err(e) => {
            warn!(%user_id, error = %e, "analysis failed");
            Err(failure(e))
        }
    }
}

fn failure(e: AnalysisError) -> Failure {
    (
        e.status(),
        Json(AnalysisFailure {
            error: e.to_string(),
            retryable: e.retryable(),
        }),
    )
}

/// Accepts both raw base64 and `data:<mime>;base64,<payload>` URLs.
fn split_data_url(input: &str) -> (Option<&str>, &str) {
    match input.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((meta, payload)) => {
            let mime = meta.strip_suffix(";base64").unwrap_or(meta);
            (Some(mime), payload)
        }
        None => (None, input),
    }
}

/// POST /analysis (multipart, field `photo`)
#[instrument(skip(state, mp))]
pub async fn analyze_multipart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<AnalysisResponse>, Failure> {
    while let Some(field) = mp.next_field().await.map_err(upload_error)? {
        if !matches!(field.name(), Some("photo") | Some("file")) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(upload_error)?;
        return run(&state, user_id, data, &content_type).await;
    }
    Err(client_error("photo is required"))
}

/// POST /analysis/base64 { image_b64, content_type? }
#[instrument(skip(state, body))]
pub async fn analyze_base64(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AnalyzeBase64Request>,
) -> Result<Json<AnalysisResponse>, Failure> {
    let (url_mime, payload) = split_data_url(body.image_b64.trim());
    let content_type = body
        .content_type
        .as_deref()
        .or(url_mime)
        .unwrap_or("image/jpeg")
        .to_string();
    let bytes = Base64::decode_vec(payload).map_err(|_| client_error("invalid base64"))?;
    run(&state, user_id, Bytes::from(bytes), &content_type).await
}
