use super::context::JobContext;
use thiserror::Error;

/// Errors that can occur while triggering or executing a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found")]
    NotFound,
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Job panicked: {0}")]
    Panicked(String),
}

/// Trait for background jobs.
///
/// Jobs are executed synchronously on the blocking thread pool; the caller
/// awaits their completion.
pub trait BackgroundJob: Send + Sync {
    /// Unique identifier, also the last segment of the trigger URL.
    fn id(&self) -> &'static str;

    /// Human-readable name for this job.
    fn name(&self) -> &'static str;

    /// Description of what this job does.
    fn description(&self) -> &'static str;

    /// Execute the job.
    ///
    /// This method is called from a blocking context using `spawn_blocking`.
    fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}
