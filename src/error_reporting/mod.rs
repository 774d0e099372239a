//! Forwarding of client-side errors to an external telemetry service.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;
use uuid::Uuid;

/// Error report as sent by the web client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientErrorReport {
    pub message: String,
    pub stack: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
}

/// A client error enriched with server-side metadata, ready to be forwarded.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub event_id: String,
    pub timestamp: String,
    pub user_id: Option<usize>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ErrorEvent {
    pub fn from_report(report: ClientErrorReport, user_id: Option<usize>) -> Self {
        ErrorEvent {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            user_id,
            message: report.message,
            stack: report.stack,
            url: report.url,
            user_agent: report.user_agent,
        }
    }
}

#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, event: &ErrorEvent) -> Result<()>;
}

/// Logs error events. Used when no telemetry endpoint is configured.
pub struct LogErrorReporter;

#[async_trait]
impl ErrorReporter for LogErrorReporter {
    async fn report(&self, event: &ErrorEvent) -> Result<()> {
        error!(
            "Client error {} (user_id={:?}, url={:?}): {}",
            event.event_id, event.user_id, event.url, event.message
        );
        Ok(())
    }
}

/// POSTs error events as JSON to a telemetry ingestion URL.
pub struct HttpErrorReporter {
    client: reqwest::Client,
    url: String,
}

impl HttpErrorReporter {
    pub fn new(url: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to build telemetry client")?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ErrorReporter for HttpErrorReporter {
    async fn report(&self, event: &ErrorEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .with_context(|| format!("Failed to reach telemetry endpoint {}", self.url))?;

        if !response.status().is_success() {
            bail!("Telemetry endpoint responded with status {}", response.status());
        }
        Ok(())
    }
}
