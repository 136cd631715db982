use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::Uri,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::{
    error::ServiceError,
    pipeline::{GenerationRequest, GenerationResult, Operation, select_for},
    service::CodegenService,
};

/// Largest request body accepted on the API routes.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn build_router(service: Arc<CodegenService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate).fallback(method_not_allowed))
        .route("/api/refine", post(refine).fallback(method_not_allowed))
        .route("/api/convert", post(convert).fallback(method_not_allowed))
        .fallback(unknown_route)
        .with_state(service)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn method_not_allowed() -> ServiceError {
    ServiceError::MethodNotAllowed
}

async fn unknown_route(uri: Uri) -> ServiceError {
    warn!(path = uri.path(), "request for unknown route");
    ServiceError::InvalidRequest(format!("unsupported operation: {}", uri.path()))
}

async fn generate(
    State(service): State<Arc<CodegenService>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerationResult>, ServiceError> {
    run(&service, Operation::Generate, body).await
}

async fn refine(
    State(service): State<Arc<CodegenService>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerationResult>, ServiceError> {
    run(&service, Operation::Refine, body).await
}

async fn convert(
    State(service): State<Arc<CodegenService>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerationResult>, ServiceError> {
    run(&service, Operation::Convert, body).await
}

async fn run(
    service: &CodegenService,
    operation: Operation,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerationResult>, ServiceError> {
    let request = body
        .map_err(|e| {
            ServiceError::InvalidRequest(format!("unreadable request body: {}", e.body_text()))
        })
        .and_then(|body| parse_request(&body))
        .and_then(|request| select_for(operation, request));
    let selected = match request {
        Ok(selected) => selected,
        Err(err) => {
            warn!(%operation, error = %err, "rejected request");
            return Err(err);
        }
    };
    let result = service.execute(selected).await?;
    Ok(Json(result))
}

/// Decodes a JSON body. Malformed bodies are caller errors (400), unlike
/// axum's `Json` extractor which would answer 415 or 422.
pub fn parse_request(body: &[u8]) -> Result<GenerationRequest, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::InvalidRequest("request body is required".into()));
    }
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::InvalidRequest(format!("invalid JSON body: {e}")))
}
