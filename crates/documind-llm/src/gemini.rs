use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::http::build_client;
use crate::provider::LlmProvider;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROVIDER: &str = "gemini";
const MODEL_PREFIX: &str = "models/";

#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    /// `request_timeout` bounds each model call end to end.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        api_key: String,
        mut base_url: String,
        request_timeout: Duration,
    ) -> Result<Self, LlmError> {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            client: build_client(request_timeout)?,
            api_key,
            base_url,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix(MODEL_PREFIX).unwrap_or(model);
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn send_generate(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [TextPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let text = check_status(response).await?;
        let resp: GenerateResponse = serde_json::from_str(&text)?;
        resp.into_text()
    }
}

/// Read the body and turn non-success statuses into [`LlmError`].
async fn check_status(response: reqwest::Response) -> Result<String, LlmError> {
    let status = response.status();
    let text = response.text().await.map_err(LlmError::Http)?;

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited);
    }

    if !status.is_success() {
        tracing::error!("Gemini API error {status}: {text}");
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned());
        return Err(LlmError::Api {
            provider: PROVIDER,
            status: status.as_u16(),
            message,
        });
    }

    Ok(text)
}

impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        tracing::debug!(model, prompt_chars = prompt.len(), "Gemini generateContent");
        self.send_generate(prompt, model).await
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let response = self
            .client
            .get(format!("{}/models?pageSize=1000", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let text = check_status(response).await?;
        let resp: ListModelsResponse = serde_json::from_str(&text)?;
        Ok(resp.models.into_iter().map(|m| m.name).collect())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, LlmError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if !text.is_empty() {
            return Ok(text);
        }
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::Other(format!("prompt blocked by Gemini: {reason}")));
        }
        Err(LlmError::EmptyResponse { provider: PROVIDER })
    }
}

#[derive(Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}
