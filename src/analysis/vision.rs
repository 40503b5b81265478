use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::VisionConfig;

/// Instruction sent with every photo. The numbered layout is what
/// `extract_nutrition` reads back.
pub const FOOD_PROMPT: &str = "Analyze the food in this photo and answer with exactly seven \
numbered findings on separate lines:\n\
1) the name of the food\n\
2) estimated calories, as \"N calories\"\n\
3) protein, as \"N grams protein\"\n\
4) fat, as \"N grams fat\"\n\
5) carbohydrates, as \"N grams carbohydrates\"\n\
6) sugar, as \"N grams sugar\"\n\
7) yes or no: is this junk food";

/// Generative vision model that describes a food photo in free text.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Text of the first candidate, or `None` when the model returned no text.
    async fn describe_food(&self, image: Bytes, mime_type: &str)
        -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_candidate_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(cfg: &VisionConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build vision http client")?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VisionClient for GeminiClient {
    #[instrument(skip(self, image), fields(model = %self.model, bytes = image.len()))]
    async fn describe_food(
        &self,
        image: Bytes,
        mime_type: &str,
    ) -> anyhow::Result<Option<String>> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: FOOD_PROMPT },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type,
                            data: Base64::encode_string(&image),
                        },
                    },
                ],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("vision request")?
            .error_for_status()
            .context("vision status")?
            .json::<GenerateContentResponse>()
            .await
            .context("vision response body")?;

        debug!(candidates = resp.candidates.len(), "vision response");
        Ok(resp.first_candidate_text())
    }
}
