//! Job trigger endpoint for external schedulers.
//!
//! `GET /api/jobs/{job_id}?token=<secret>` runs the job to completion and
//! answers 204. Callers authenticate with the shared secret only; there are no
//! sessions involved.

use super::state::ServerState;
use crate::background_jobs::JobError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::warn;

const TOKEN_QUERY_PARAM: &str = "token";
const TRIGGERED_BY_HTTP: &str = "http";

/// Exact comparison of the provided token with the configured secret.
///
/// An unset or empty secret authorizes nothing, not even an empty token.
fn is_authorized(secret: Option<&str>, token: Option<&str>) -> bool {
    match (secret, token) {
        (Some(secret), Some(token)) if !secret.is_empty() => {
            bool::from(secret.as_bytes().ct_eq(token.as_bytes()))
        }
        _ => false,
    }
}

// The query is read as a plain map: a malformed query is a missing token, so
// a 401 rather than a 400.
async fn trigger_job(
    State(state): State<ServerState>,
    Path(job_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let token = params.get(TOKEN_QUERY_PARAM).map(String::as_str);
    if !is_authorized(state.config.job_secret_token.as_deref(), token) {
        warn!("Rejected unauthorized trigger of job {}", job_id);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match state.job_registry.run(&job_id, TRIGGERED_BY_HTTP).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(JobError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub fn make_job_routes(state: ServerState) -> Router {
    Router::new()
        .route("/{job_id}", get(trigger_job))
        .with_state(state)
}
