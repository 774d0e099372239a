use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prompts_server::background_jobs::jobs::RemindOverduePromptsJob;
use prompts_server::background_jobs::JobRegistry;
use prompts_server::config::{AppConfig, CliConfig, FileConfig};
use prompts_server::error_reporting::{ErrorReporter, HttpErrorReporter, LogErrorReporter};
use prompts_server::prompts::{
    LogNotifier, ReminderNotifier, SqlitePromptStore, WebhookNotifier,
};
use prompts_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use prompts_server::user::SqliteUserStore;

const OUTBOUND_TIMEOUT_SEC: u64 = 10;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding user.db and prompts.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Telemetry endpoint client errors are forwarded to. Logged only if unset.
    #[clap(long)]
    pub error_reporting_url: Option<String>,

    /// Webhook that receives overdue prompt reminders. Logged only if unset.
    #[clap(long)]
    pub reminder_webhook_url: Option<String>,

    /// Shared secret required to trigger jobs over HTTP.
    #[clap(long, env = "JOB_SECRET_TOKEN", hide_env_values = true)]
    pub job_secret_token: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            error_reporting_url: self.error_reporting_url.clone(),
            reminder_webhook_url: self.reminder_webhook_url.clone(),
            job_secret_token: self.job_secret_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    info!("Resolved config: {:?}", app_config);

    if app_config.jobs.secret_token.is_none() {
        warn!("JOB_SECRET_TOKEN is not set, every job trigger will be rejected");
    }

    info!("Opening user store at {:?}...", app_config.user_db_path());
    let user_store = Arc::new(SqliteUserStore::new(app_config.user_db_path())?);

    info!("Opening prompt store at {:?}...", app_config.prompts_db_path());
    let prompt_store = Arc::new(SqlitePromptStore::new(app_config.prompts_db_path())?);

    let notifier: Arc<dyn ReminderNotifier> = match &app_config.reminder_webhook_url {
        Some(url) => {
            info!("Reminders will be sent to {}", url);
            Arc::new(WebhookNotifier::new(url.clone(), OUTBOUND_TIMEOUT_SEC))
        }
        None => Arc::new(LogNotifier),
    };

    let error_reporter: Arc<dyn ErrorReporter> = match &app_config.error_reporting_url {
        Some(url) => {
            info!("Client errors will be forwarded to {}", url);
            Arc::new(HttpErrorReporter::new(url.clone(), OUTBOUND_TIMEOUT_SEC)?)
        }
        None => Arc::new(LogErrorReporter),
    };

    let job_registry =
        JobRegistry::new().with_job(Arc::new(RemindOverduePromptsJob::new(prompt_store, notifier)));
    info!("Registered jobs: {:?}", job_registry.ids());

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        frontend_dir_path: app_config.frontend_dir_path.clone(),
        job_secret_token: app_config.jobs.secret_token.clone(),
    };

    info!("Ready to serve at port {}!", app_config.port);
    run_server(server_config, user_store, job_registry, error_reporter).await
}
