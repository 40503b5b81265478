use axum::http::StatusCode;
use tracing::error;

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

/// Log the full error chain and answer with an opaque 500.
pub fn internal<E: Into<anyhow::Error>>(e: E) -> ApiError {
    let e = e.into();
    error!(error = %format!("{e:#}"), "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".into(),
    )
}

pub fn bad_request(msg: impl ToString) -> ApiError {
    (StatusCode::BAD_REQUEST, msg.to_string())
}
