//! Background jobs triggered on demand.
//!
//! Periodicity is owned by an external scheduler calling the job trigger
//! endpoint; this module only knows how to find a job and run it to completion.

mod context;
mod job;
pub mod jobs;
mod registry;

pub use context::JobContext;
pub use job::{BackgroundJob, JobError};
pub use registry::JobRegistry;
