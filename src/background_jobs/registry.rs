use super::context::JobContext;
use super::job::{BackgroundJob, JobError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Jobs that can be triggered by id.
///
/// There is no bookkeeping of running jobs: triggering the same job twice
/// runs it twice, concurrently if the calls overlap.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: HashMap<&'static str, Arc<dyn BackgroundJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job, replacing any job previously registered with the same id.
    pub fn register(&mut self, job: Arc<dyn BackgroundJob>) {
        info!("Registered job {} ({})", job.id(), job.name());
        self.jobs.insert(job.id(), job);
    }

    pub fn with_job(mut self, job: Arc<dyn BackgroundJob>) -> Self {
        self.register(job);
        self
    }

    pub fn get(&self, job_id: &str) -> Option<Arc<dyn BackgroundJob>> {
        self.jobs.get(job_id).cloned()
    }

    /// Registered job ids, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.jobs.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Runs the job on the blocking pool and waits for it to finish.
    pub async fn run(&self, job_id: &str, triggered_by: &str) -> Result<(), JobError> {
        let job = self.get(job_id).ok_or(JobError::NotFound)?;
        let ctx = JobContext::new(triggered_by);
        let start = Instant::now();

        info!("Running job {} (triggered by {})", job_id, triggered_by);
        let result = tokio::task::spawn_blocking(move || job.execute(&ctx))
            .await
            .map_err(|join_err| JobError::Panicked(join_err.to_string()))
            .and_then(|r| r);

        match &result {
            Ok(()) => info!(
                "Job {} completed in {}ms",
                job_id,
                start.elapsed().as_millis()
            ),
            Err(e) => error!(
                "Job {} failed after {}ms: {}",
                job_id,
                start.elapsed().as_millis(),
                e
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingJob {
        runs: AtomicUsize,
        fail: bool,
    }

    impl BackgroundJob for CountingJob {
        fn id(&self) -> &'static str {
            "counting"
        }

        fn name(&self) -> &'static str {
            "Counting"
        }

        fn description(&self) -> &'static str {
            "Counts its runs"
        }

        fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
            assert_eq!(ctx.triggered_by, "test");
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(JobError::ExecutionFailed("boom".to_string()));
            }
            Ok(())
        }
    }

    struct PanickingJob;

    impl BackgroundJob for PanickingJob {
        fn id(&self) -> &'static str {
            "panicking"
        }

        fn name(&self) -> &'static str {
            "Panicking"
        }

        fn description(&self) -> &'static str {
            "Always panics"
        }

        fn execute(&self, _ctx: &JobContext) -> Result<(), JobError> {
            panic!("job exploded");
        }
    }

    #[tokio::test]
    async fn runs_registered_job() {
        let job = Arc::new(CountingJob {
            runs: AtomicUsize::new(0),
            fail: false,
        });
        let registry = JobRegistry::new().with_job(job.clone());

        registry.run("counting", "test").await.unwrap();
        registry.run("counting", "test").await.unwrap();

        assert_eq!(job.runs.load(Ordering::SeqCst), 2);
        assert_eq!(registry.ids(), vec!["counting"]);
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let registry = JobRegistry::new();
        let result = registry.run("missing", "test").await;
        assert!(matches!(result, Err(JobError::NotFound)));
    }

    #[tokio::test]
    async fn propagates_job_failure() {
        let job = Arc::new(CountingJob {
            runs: AtomicUsize::new(0),
            fail: true,
        });
        let registry = JobRegistry::new().with_job(job.clone());

        let result = registry.run("counting", "test").await;
        assert!(matches!(result, Err(JobError::ExecutionFailed(_))));
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panic_is_reported_as_error() {
        let registry = JobRegistry::new().with_job(Arc::new(PanickingJob));
        let result = registry.run("panicking", "test").await;
        assert!(matches!(result, Err(JobError::Panicked(_))));
    }
}
