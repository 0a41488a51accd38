//! HTTP request handlers for the compliance API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RuleThresholds;

use super::request::EvaluateParams;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Largest schedule document accepted by `POST /evaluate`, in bytes.
///
/// Multi-page scans run far past axum's 2 MB default.
pub const MAX_DOCUMENT_BYTES: usize = 64 * 1024 * 1024;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/evaluate", post(evaluate_handler))
        .route("/thresholds", get(get_thresholds_handler).put(put_thresholds_handler))
        .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES))
        .with_state(state)
}

/// Handler for POST /evaluate.
///
/// The body is the schedule document. The `filename` query parameter and the
/// `Content-Type` header decide its format.
async fn evaluate_handler(
    State(state): State<AppState>,
    Query(params): Query<EvaluateParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    info!(
        correlation_id = %correlation_id,
        filename = params.filename.as_deref().unwrap_or(""),
        content_type = content_type.as_deref().unwrap_or(""),
        bytes = body.len(),
        "Processing evaluation request"
    );

    if body.is_empty() {
        warn!(correlation_id = %correlation_id, "Empty document");
        return ApiErrorResponse::new(StatusCode::BAD_REQUEST, ApiError::empty_document())
            .into_response();
    }

    let start_time = Instant::now();
    let evaluator = state.evaluator();
    match evaluator
        .evaluate_with_deadline(body.to_vec(), params.filename, content_type)
        .await
    {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                agents = report.agents.len(),
                violations = report.violations.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Evaluation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(report),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Evaluation failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for GET /thresholds.
async fn get_thresholds_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.thresholds().snapshot();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(snapshot.as_ref().clone()),
    )
        .into_response()
}

/// Handler for PUT /thresholds.
///
/// Validates and installs the new caps. Evaluations already running keep
/// the snapshot they started with.
async fn put_thresholds_handler(
    State(state): State<AppState>,
    payload: Result<Json<RuleThresholds>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing thresholds update");

    let thresholds = match payload {
        Ok(Json(thresholds)) => thresholds,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err.body_text(),
                        "JSON data error"
                    );
                    ApiError::new("VALIDATION_ERROR", err.body_text())
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return ApiErrorResponse::new(StatusCode::BAD_REQUEST, error).into_response();
        }
    };

    match state.thresholds().replace(thresholds) {
        Ok(()) => {
            info!(correlation_id = %correlation_id, "Thresholds updated");
            let snapshot = state.thresholds().snapshot();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(snapshot.as_ref().clone()),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Thresholds rejected"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}
