//! Prompts assigned to users and the reminders sent when they go overdue.

mod models;
mod notifier;
mod prompt_store;
mod sqlite_prompt_store;

pub use models::{Prompt, PromptReminder};
pub use notifier::{LogNotifier, ReminderNotifier, WebhookNotifier};
pub use prompt_store::PromptStore;
pub use sqlite_prompt_store::SqlitePromptStore;
