use serde::{Deserialize, Serialize};

use crate::nutrition::ExtractedNutrition;

#[derive(Debug, Deserialize)]
pub struct AnalyzeBase64Request {
    pub image_b64: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub nutrition: ExtractedNutrition,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
    /// The client should offer to try the same photo again.
    pub retryable: bool,
}
