//! HTTP API module for the loan decision engine.
//!
//! This module provides the REST endpoints for evaluating single applicants
//! and batches, building sanction summaries, and inspecting the loaded
//! policy.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchEvaluateRequest, EvaluateRequest};
pub use response::{ApiError, ApiErrorResponse, BatchEvaluateResponse, PolicyResponse};
pub use state::AppState;
