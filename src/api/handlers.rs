//! HTTP request handlers for the loan decision API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::evaluate_all;
use crate::sanction::SanctionSummary;

use super::request::{BatchEvaluateRequest, EvaluateRequest};
use super::response::{ApiError, ApiErrorResponse, BatchEvaluateResponse, PolicyResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/evaluate", post(evaluate_handler))
        .route("/evaluate/batch", post(batch_handler))
        .route("/sanction-summary", post(sanction_summary_handler))
        .route("/policy", get(policy_handler))
        .with_state(state)
}

/// Handler for POST /evaluate.
///
/// Evaluates one applicant and returns the decision with its audit trace.
/// One evaluation is a bounded set of table lookups, so it runs inline on
/// the request task; only batches move to the blocking pool.
async fn evaluate_handler(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing evaluation request");

    let request = accept(correlation_id, payload)?;
    let base_rate = effective_base_rate(correlation_id, &state, request.base_rate)?;

    let start_time = Instant::now();
    let decision = state.engine().evaluate(&request.applicant, base_rate);
    info!(
        correlation_id = %correlation_id,
        applicant = %request.applicant.name,
        eligible = decision.eligible,
        decided_by = %decision.decided_by,
        duration_us = start_time.elapsed().as_micros(),
        "Evaluation completed"
    );

    Ok(json_ok(decision))
}

/// Handler for POST /evaluate/batch.
///
/// Evaluation runs on the blocking pool so the worker threads never stall
/// the async runtime.
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchEvaluateRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing batch evaluation request");

    let request = accept(correlation_id, payload)?;
    let base_rate = effective_base_rate(correlation_id, &state, request.base_rate)?;

    let start_time = Instant::now();
    let engine = state.engine_handle();
    let workers = state.workers();
    let applicants = request.applicants;
    let count = applicants.len();

    let decisions = tokio::task::spawn_blocking(move || {
        evaluate_all(&engine, &applicants, base_rate, workers)
    })
    .await
    .map_err(|err| {
        warn!(correlation_id = %correlation_id, error = %err, "Batch task failed");
        ApiErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::internal(format!("Task join error: {}", err)),
        }
    })?;

    info!(
        correlation_id = %correlation_id,
        applicants = count,
        sanctioned = decisions.iter().filter(|d| d.eligible).count(),
        duration_us = start_time.elapsed().as_micros(),
        "Batch evaluation completed"
    );

    Ok(json_ok(BatchEvaluateResponse { decisions }))
}

/// Handler for POST /sanction-summary.
async fn sanction_summary_handler(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing sanction summary request");

    let request = accept(correlation_id, payload)?;
    let base_rate = effective_base_rate(correlation_id, &state, request.base_rate)?;

    let decision = state.engine().evaluate(&request.applicant, base_rate);
    let summary = SanctionSummary::from_decision(&request.applicant, &decision);
    info!(
        correlation_id = %correlation_id,
        applicant = %summary.applicant_name,
        letter_ready = summary.letter_ready(),
        "Sanction summary built"
    );

    Ok(json_ok(summary))
}

/// Handler for GET /policy.
async fn policy_handler(State(state): State<AppState>) -> Response {
    let engine = state.engine();
    json_ok(PolicyResponse {
        policy: engine.policy().metadata().clone(),
        effective_base_rate: state.base_rate(),
        compliance_checks: engine.check_ids().into_iter().map(str::to_string).collect(),
    })
}

fn json_ok<T: serde::Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Unwraps a JSON body, mapping extractor rejections to API errors.
fn accept<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message, including the field path.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
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

    Err(ApiErrorResponse::bad_request(error))
}

fn effective_base_rate(
    correlation_id: Uuid,
    state: &AppState,
    requested: Option<Decimal>,
) -> Result<Decimal, ApiErrorResponse> {
    let base_rate = requested.unwrap_or_else(|| state.base_rate());
    if base_rate < Decimal::ZERO {
        warn!(correlation_id = %correlation_id, base_rate = %base_rate, "Negative base rate");
        return Err(ApiErrorResponse::bad_request(ApiError::validation_error(
            format!("base_rate must not be negative (got {})", base_rate),
        )));
    }
    Ok(base_rate)
}
