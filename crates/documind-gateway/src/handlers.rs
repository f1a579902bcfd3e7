use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use documind_core::{AssistantError, IndexOutcome};
use documind_memory::{Chunk, CollectionIndex};
use serde::{Deserialize, Serialize};

use crate::server::AppState;

const UNCONFIGURED_ERROR: &str = "Gemini API not configured";
const UNCONFIGURED_ANSWER: &str =
    "Backend error: Gemini API is not configured. Please check your GEMINI_API_KEY in the .env.";
const UNCONFIGURED_LIST_ERROR: &str = "Gemini client not configured";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IndexPayload {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatPayload {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    gemini_configured: bool,
    model: &'a str,
}

#[derive(Serialize)]
struct IndexResponse {
    status: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// A failed chat still carries the answer fields so clients can render it inline.
#[derive(Serialize)]
struct ChatErrorBody {
    error: String,
    answer_markdown: String,
    math_expressions: Vec<String>,
    sources_markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_models: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ModelsResponse {
    models: Vec<String>,
}

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
        }),
    )
        .into_response()
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::BAD_REQUEST
    };
    tracing::debug!(%status, "rejected request body: {}", rejection.body_text());
    error_response(status, rejection.body_text())
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        gemini_configured: state.assistant.is_configured(),
        model: state.assistant.default_model(),
    })
    .into_response()
}

pub(crate) async fn index_handler(
    State(state): State<AppState>,
    payload: Result<Json<IndexPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    let collection = payload.collection.unwrap_or_default();
    let index = CollectionIndex::new(
        payload.source,
        payload.chunks,
        payload.total_pages,
        payload.processed_at,
    );

    match state.assistant.index(&collection, index).await {
        Ok(IndexOutcome::Saved { .. }) => Json(IndexResponse {
            status: "success",
            message: "Document indexed successfully",
            error: None,
        })
        .into_response(),
        Ok(IndexOutcome::Unsaved { error }) => Json(IndexResponse {
            status: "warning",
            message: "Index received but failed to save locally",
            error: Some(error),
        })
        .into_response(),
        Err(AssistantError::Validation(msg)) => error_response(StatusCode::BAD_REQUEST, msg),
        Err(e) => {
            tracing::error!("error in /api/index: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub(crate) async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };

    match state
        .assistant
        .answer(
            &payload.question,
            payload.collection.as_deref(),
            payload.model.as_deref(),
        )
        .await
    {
        Ok(answer) => Json(answer).into_response(),
        Err(e) => chat_error_response(e),
    }
}

fn chat_error_response(err: AssistantError) -> Response {
    let body = match err {
        AssistantError::Validation(msg) => return error_response(StatusCode::BAD_REQUEST, msg),
        AssistantError::BackendUnconfigured => ChatErrorBody {
            error: UNCONFIGURED_ERROR.into(),
            answer_markdown: UNCONFIGURED_ANSWER.into(),
            math_expressions: Vec::new(),
            sources_markdown: String::new(),
            available_models: None,
        },
        AssistantError::Model {
            source,
            sources_markdown,
            available_models,
        } => ChatErrorBody {
            error: source.to_string(),
            answer_markdown: format!("Error while calling model: {source}"),
            math_expressions: Vec::new(),
            sources_markdown,
            available_models,
        },
        other => {
            tracing::error!("error in /api/chat: {other}");
            ChatErrorBody {
                error: other.to_string(),
                answer_markdown: format!("Error: {other}"),
                math_expressions: Vec::new(),
                sources_markdown: String::new(),
                available_models: None,
            }
        }
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

pub(crate) async fn list_models_handler(State(state): State<AppState>) -> Response {
    match state.assistant.list_models().await {
        Ok(models) => Json(ModelsResponse { models }).into_response(),
        Err(AssistantError::BackendUnconfigured) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, UNCONFIGURED_LIST_ERROR)
        }
        Err(e) => {
            tracing::error!("error listing models: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
