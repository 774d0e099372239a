//! Delivery of prompt reminders.
//!
//! Notifiers are called from the blocking thread pool while a job runs, so they
//! are synchronous.

use super::models::PromptReminder;
use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::info;

pub trait ReminderNotifier: Send + Sync {
    fn notify(&self, reminder: &PromptReminder) -> Result<()>;
}

/// Writes reminders to the log. Used when no webhook is configured.
pub struct LogNotifier;

impl ReminderNotifier for LogNotifier {
    fn notify(&self, reminder: &PromptReminder) -> Result<()> {
        info!(
            "Reminder for user_id={}: prompt {} was due at {}",
            reminder.user_id, reminder.prompt_id, reminder.due_at
        );
        Ok(())
    }
}

/// POSTs each reminder as JSON to a webhook URL.
pub struct WebhookNotifier {
    url: String,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout_sec: u64) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(timeout_sec),
        }
    }
}

impl ReminderNotifier for WebhookNotifier {
    fn notify(&self, reminder: &PromptReminder) -> Result<()> {
        // The blocking client owns its own runtime; it has to be created and
        // dropped outside of the async executor.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build webhook client")?;

        let response = client
            .post(&self.url)
            .json(reminder)
            .send()
            .with_context(|| format!("Failed to reach reminder webhook {}", self.url))?;

        if !response.status().is_success() {
            bail!(
                "Reminder webhook responded with status {}",
                response.status()
            );
        }
        Ok(())
    }
}
