use anyhow::{Context, Result};
use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::State, middleware, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::info;

use super::client_error_routes::make_client_error_routes;
use super::job_routes::make_job_routes;
use super::layout_routes::make_layout_routes;
use super::{log_requests, state::*, ServerConfig};
use crate::background_jobs::JobRegistry;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn make_app(
    config: ServerConfig,
    user_store: GuardedUserStore,
    job_registry: JobRegistry,
    error_reporter: GuardedErrorReporter,
) -> Result<Router> {
    if config.job_secret_token.is_none() {
        info!("No job secret configured, job triggers will be rejected");
    }
    let state = ServerState::new(config.clone(), user_store, job_registry, error_reporter);

    let v1_routes: Router = make_layout_routes(state.clone())
        .merge(make_client_error_routes(state.clone()));

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let mut app: Router = home_router
        .nest("/api/jobs", make_job_routes(state.clone()))
        .nest("/v1", v1_routes);

    if let Some(frontend_path) = config.frontend_dir_path {
        let static_files_service =
            ServeDir::new(frontend_path).append_index_html_on_directories(true);
        app = app.fallback_service(static_files_service);
    }

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(
    config: ServerConfig,
    user_store: GuardedUserStore,
    job_registry: JobRegistry,
    error_reporter: GuardedErrorReporter,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, user_store, job_registry, error_reporter)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}
