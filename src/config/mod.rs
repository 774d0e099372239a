mod file_config;

pub use file_config::{FileConfig, JobsConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub error_reporting_url: Option<String>,
    pub reminder_webhook_url: Option<String>,
    /// Usually filled from the `JOB_SECRET_TOKEN` environment variable.
    pub job_secret_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub error_reporting_url: Option<String>,
    pub reminder_webhook_url: Option<String>,
    pub jobs: JobsSettings,
}

#[derive(Clone, Default)]
pub struct JobsSettings {
    /// Never `Some("")`: an empty secret is resolved to `None`.
    pub secret_token: Option<String>,
}

impl std::fmt::Debug for JobsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobsSettings")
            .field(
                "secret_token",
                &self.secret_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let error_reporting_url = file
            .error_reporting_url
            .or_else(|| cli.error_reporting_url.clone());
        let reminder_webhook_url = file
            .reminder_webhook_url
            .or_else(|| cli.reminder_webhook_url.clone());

        // An empty value in either source counts as not set.
        let secret_token = file
            .jobs
            .and_then(|jobs| jobs.secret_token)
            .filter(|token| !token.is_empty())
            .or_else(|| cli.job_secret_token.clone())
            .filter(|token| !token.is_empty());

        Ok(Self {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            error_reporting_url,
            reminder_webhook_url,
            jobs: JobsSettings { secret_token },
        })
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }

    pub fn prompts_db_path(&self) -> PathBuf {
        self.db_dir.join("prompts.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
