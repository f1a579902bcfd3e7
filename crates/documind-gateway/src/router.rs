use std::any::Any;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    chat_handler, error_response, health_handler, index_handler, list_models_handler,
};
use super::server::AppState;

/// Routes under `/api`, with body limit, request tracing, panic recovery and optional CORS.
pub fn build_router(state: AppState, max_body_size: usize, cors: bool) -> Router {
    let router = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/index", post(index_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/list-models", get(list_models_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(cors::Any)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("handler panicked: {detail}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {detail}"))
}
