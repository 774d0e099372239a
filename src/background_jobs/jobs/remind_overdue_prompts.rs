//! Overdue prompts reminder job.
//!
//! Triggered by the external cron through `/api/jobs/remind-prompts`. Every
//! overdue prompt gets at most one reminder.

use crate::background_jobs::{BackgroundJob, JobContext, JobError};
use crate::prompts::{PromptReminder, PromptStore, ReminderNotifier};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const REMIND_PROMPTS_JOB_ID: &str = "remind-prompts";

pub struct RemindOverduePromptsJob {
    prompt_store: Arc<dyn PromptStore>,
    notifier: Arc<dyn ReminderNotifier>,
}

impl RemindOverduePromptsJob {
    pub fn new(prompt_store: Arc<dyn PromptStore>, notifier: Arc<dyn ReminderNotifier>) -> Self {
        Self {
            prompt_store,
            notifier,
        }
    }
}

impl BackgroundJob for RemindOverduePromptsJob {
    fn id(&self) -> &'static str {
        REMIND_PROMPTS_JOB_ID
    }

    fn name(&self) -> &'static str {
        "Remind Overdue Prompts"
    }

    fn description(&self) -> &'static str {
        "Notify users about prompts past their due date"
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let now = ctx.started_at_secs();
        let overdue = self
            .prompt_store
            .list_overdue_prompts(now)
            .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;

        if overdue.is_empty() {
            info!("No overdue prompts");
            return Ok(());
        }

        let mut reminded = 0;
        for prompt in &overdue {
            // Claim before notifying so overlapping runs never remind twice.
            let claimed = self
                .prompt_store
                .claim_reminder(prompt.id, now)
                .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;
            if !claimed {
                debug!("Prompt {} already claimed by another run", prompt.id);
                continue;
            }

            // A failed delivery leaves the prompt unreminded for the next run.
            if let Err(e) = self.notifier.notify(&PromptReminder::from(prompt)) {
                warn!("Failed to send reminder for prompt {}: {:#}", prompt.id, e);
                self.prompt_store
                    .release_reminder(prompt.id, now)
                    .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;
                continue;
            }
            reminded += 1;
        }

        info!(
            "Sent {} reminders for {} overdue prompts",
            reminded,
            overdue.len()
        );
        Ok(())
    }
}
