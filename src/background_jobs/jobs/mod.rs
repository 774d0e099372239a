//! Specific background job implementations.

pub mod remind_overdue_prompts;

pub use remind_overdue_prompts::{RemindOverduePromptsJob, REMIND_PROMPTS_JOB_ID};
