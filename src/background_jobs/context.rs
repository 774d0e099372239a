use chrono::{DateTime, Utc};

/// Context provided to jobs during execution.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Who asked for this run, e.g. `http` for the trigger endpoint.
    pub triggered_by: String,

    /// When the run started. Jobs use it as their notion of "now".
    pub started_at: DateTime<Utc>,
}

impl JobContext {
    pub fn new(triggered_by: impl Into<String>) -> Self {
        Self {
            triggered_by: triggered_by.into(),
            started_at: Utc::now(),
        }
    }

    pub fn started_at_secs(&self) -> i64 {
        self.started_at.timestamp()
    }
}
