use super::session::Session;
use super::state::{GuardedErrorReporter, ServerState};
use crate::error_reporting::{ClientErrorReport, ErrorEvent};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct ClientErrorAccepted {
    event_id: String,
}

async fn post_client_error(
    session: Option<Session>,
    State(reporter): State<GuardedErrorReporter>,
    Json(report): Json<ClientErrorReport>,
) -> Response {
    if report.message.trim().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let event = ErrorEvent::from_report(report, session.map(|s| s.user_id));
    if let Err(e) = reporter.report(&event).await {
        warn!("Failed to forward client error {}: {:#}", event.event_id, e);
    }

    (
        StatusCode::ACCEPTED,
        Json(ClientErrorAccepted {
            event_id: event.event_id,
        }),
    )
        .into_response()
}

pub fn make_client_error_routes(state: ServerState) -> Router {
    Router::new()
        .route("/client-errors", post(post_client_error))
        .with_state(state)
}
