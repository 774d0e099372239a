use axum::extract::FromRef;

use crate::background_jobs::JobRegistry;
use crate::error_reporting::ErrorReporter;
use crate::user::UserStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserStore = Arc<dyn UserStore>;
pub type GuardedJobRegistry = Arc<JobRegistry>;
pub type GuardedErrorReporter = Arc<dyn ErrorReporter>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_store: GuardedUserStore,
    pub job_registry: GuardedJobRegistry,
    pub error_reporter: GuardedErrorReporter,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        user_store: GuardedUserStore,
        job_registry: JobRegistry,
        error_reporter: GuardedErrorReporter,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            user_store,
            job_registry: Arc::new(job_registry),
            error_reporter,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedUserStore {
    fn from_ref(input: &ServerState) -> Self {
        input.user_store.clone()
    }
}

impl FromRef<ServerState> for GuardedJobRegistry {
    fn from_ref(input: &ServerState) -> Self {
        input.job_registry.clone()
    }
}

impl FromRef<ServerState> for GuardedErrorReporter {
    fn from_ref(input: &ServerState) -> Self {
        input.error_reporter.clone()
    }
}
