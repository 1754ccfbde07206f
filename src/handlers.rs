use crate::errors::AppError;
use crate::models::{HealthResponse, LeadAccepted};
use crate::pipeline::LeadPipeline;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Submission pipeline wired to the configured store and notifier.
    pub pipeline: LeadPipeline,
    /// Deployment environment label reported by the health endpoints.
    pub environment: String,
}

/// Health check endpoint, served on both `/` and `/health`.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            service: "OREN backend".to_string(),
            environment: state.environment.clone(),
        }),
    )
}

/// POST /api/lead
///
/// Accepts a clinic lead, stores it and sends a best-effort acknowledgement.
///
/// The pipeline runs in its own task so that a client disconnect, which drops
/// this handler's future, cannot abandon an insert that has already started.
///
/// # Returns
///
/// * `200 {"success": true, "message": "Info received"}` once the lead is stored,
///   whatever happened to the email.
/// * `400 {"error": ...}` with the first validation message.
/// * `500 {"error": "Failed to save lead info."}` if the store write failed.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LeadAccepted>, AppError> {
    let Json(payload) = payload?;

    let pipeline = state.pipeline.clone();
    tokio::spawn(async move { pipeline.submit(&payload).await })
        .await
        .map_err(|e| AppError::InternalError(format!("Submission task failed: {}", e)))??;

    Ok(Json(LeadAccepted::default()))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
