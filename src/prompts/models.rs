use chrono::{DateTime, Utc};
use serde::Serialize;

/// A prompt assigned to a user, expected to be answered before `due_at`.
///
/// All timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub id: i64,
    pub user_id: usize,
    pub text: String,
    pub due_at: i64,
    pub answered_at: Option<i64>,
    pub reminded_at: Option<i64>,
}

/// Payload handed to a [`ReminderNotifier`](super::ReminderNotifier).
#[derive(Debug, Clone, Serialize)]
pub struct PromptReminder {
    pub prompt_id: i64,
    pub user_id: usize,
    pub text: String,
    pub due_at: String,
}

impl From<&Prompt> for PromptReminder {
    fn from(prompt: &Prompt) -> Self {
        let due_at = DateTime::<Utc>::from_timestamp(prompt.due_at, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| prompt.due_at.to_string());
        PromptReminder {
            prompt_id: prompt.id,
            user_id: prompt.user_id,
            text: prompt.text.clone(),
            due_at,
        }
    }
}
