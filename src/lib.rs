//! Prompts Server Library
//!
//! This library exposes the internal modules for testing and reuse by the
//! binaries.

pub mod background_jobs;
pub mod config;
pub mod error_reporting;
pub mod prompts;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use background_jobs::{BackgroundJob, JobContext, JobError, JobRegistry};
pub use prompts::{PromptStore, SqlitePromptStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{SqliteUserStore, UserRole, UserStore};
