use super::models::Prompt;
use anyhow::Result;

pub trait PromptStore: Send + Sync {
    fn add_prompt(&self, user_id: usize, text: &str, due_at: i64) -> Result<i64>;

    fn get_prompt(&self, prompt_id: i64) -> Result<Option<Prompt>>;

    /// Returns false if the prompt doesn't exist or was already answered.
    fn mark_answered(&self, prompt_id: i64, answered_at: i64) -> Result<bool>;

    /// Prompts past their due date at `now` that are neither answered nor
    /// reminded yet, oldest due date first.
    fn list_overdue_prompts(&self, now: i64) -> Result<Vec<Prompt>>;

    /// Atomically sets `reminded_at` if the prompt has not been reminded yet.
    ///
    /// Returns false when another run already claimed the prompt.
    fn claim_reminder(&self, prompt_id: i64, reminded_at: i64) -> Result<bool>;

    /// Undoes a claim made with `reminded_at`, so a later run can retry.
    fn release_reminder(&self, prompt_id: i64, reminded_at: i64) -> Result<()>;
}
