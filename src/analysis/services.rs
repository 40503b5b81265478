use axum::http::StatusCode;
use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use super::vision::VisionClient;
use crate::nutrition::{extract_nutrition, ExtractError, ExtractedNutrition};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("photo is empty")]
    EmptyPhoto,
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
    #[error("vision request failed: {0}")]
    Upstream(String),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl AnalysisError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalysisError::EmptyPhoto | AnalysisError::UnsupportedContentType(_) => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::Upstream(_) | AnalysisError::Extract(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether sending the same photo again may succeed.
    pub fn retryable(&self) -> bool {
        self.status() == StatusCode::BAD_GATEWAY
    }
}

/// Canonical MIME type for photo uploads we forward to the model.
pub fn normalize_image_type(ct: &str) -> Option<&'static str> {
    let base = ct.split(';').next().unwrap_or_default().trim();
    match base.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("image/jpeg"),
        "image/png" => Some("image/png"),
        "image/webp" => Some("image/webp"),
        "image/heic" => Some("image/heic"),
        "image/heif" => Some("image/heif"),
        _ => None,
    }
}

/// Send one photo to the vision model and read the nutrition facts out of its answer.
///
/// The photo is not kept anywhere.
pub async fn analyze_photo(
    vision: &dyn VisionClient,
    photo: Bytes,
    content_type: &str,
) -> Result<ExtractedNutrition, AnalysisError> {
    if photo.is_empty() {
        return Err(AnalysisError::EmptyPhoto);
    }
    let mime = normalize_image_type(content_type)
        .ok_or_else(|| AnalysisError::UnsupportedContentType(content_type.to_string()))?;

    let text = vision
        .describe_food(photo, mime)
        .await
        .map_err(|e| {
            warn!(error = %format!("{e:#}"), "vision request failed");
            AnalysisError::Upstream(e.to_string())
        })?
        .unwrap_or_default();

    let nutrition = extract_nutrition(&text).inspect_err(|_| {
        warn!("vision model returned no text");
    })?;

    info!(
        food = %nutrition.food_name,
        calories = ?nutrition.calories,
        junk = nutrition.is_junk_food,
        "photo analyzed"
    );
    Ok(nutrition)
}
