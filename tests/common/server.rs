//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own databases. The reminder job
//! is wired to a [`RecordingNotifier`] so tests can observe its effects.

use super::constants::*;
use super::fixtures::{create_test_db_with_users, RecordingNotifier, TestUserIds};
use async_trait::async_trait;
use prompts_server::background_jobs::jobs::RemindOverduePromptsJob;
use prompts_server::background_jobs::{BackgroundJob, JobRegistry};
use prompts_server::error_reporting::{ErrorEvent, ErrorReporter};
use prompts_server::prompts::{PromptStore, SqlitePromptStore};
use prompts_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use prompts_server::user::SqliteUserStore;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Error reporter that keeps every event in memory.
#[derive(Default)]
pub struct RecordingErrorReporter {
    pub events: Mutex<Vec<ErrorEvent>>,
}

#[async_trait]
impl ErrorReporter for RecordingErrorReporter {
    async fn report(&self, event: &ErrorEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Knobs for [`TestServer::spawn_with`].
pub struct TestServerOptions {
    /// Job secret handed to the server, as if read from `JOB_SECRET_TOKEN`.
    pub job_secret: Option<String>,
    /// Jobs registered next to the reminder job.
    pub extra_jobs: Vec<Arc<dyn BackgroundJob>>,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            job_secret: Some(JOB_SECRET.to_string()),
            extra_jobs: Vec::new(),
        }
    }
}

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Prompt store for seeding and inspecting prompts
    pub prompt_store: Arc<dyn PromptStore>,

    /// Every reminder the reminder job sent
    pub notifier: Arc<RecordingNotifier>,

    /// Every client error the server forwarded
    pub error_reporter: Arc<RecordingErrorReporter>,

    pub user_ids: TestUserIds,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server configured with [`JOB_SECRET`].
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the databases can't be created, the port can't be bound or
    /// the server doesn't become ready within timeout.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let (temp_db_dir, user_db_path, prompts_db_path, user_ids) =
            create_test_db_with_users().expect("Failed to create test database");

        let user_store =
            Arc::new(SqliteUserStore::new(&user_db_path).expect("Failed to open user store"));
        let prompt_store: Arc<dyn PromptStore> = Arc::new(
            SqlitePromptStore::new(&prompts_db_path).expect("Failed to open prompt store"),
        );
        let notifier = Arc::new(RecordingNotifier::default());
        let error_reporter = Arc::new(RecordingErrorReporter::default());

        let mut job_registry = JobRegistry::new().with_job(Arc::new(
            RemindOverduePromptsJob::new(prompt_store.clone(), notifier.clone()),
        ));
        for job in options.extra_jobs {
            job_registry.register(job);
        }

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            job_secret_token: options.job_secret,
        };

        let app = make_app(config, user_store, job_registry, error_reporter.clone())
            .expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            prompt_store,
            notifier,
            error_reporter,
            user_ids,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
