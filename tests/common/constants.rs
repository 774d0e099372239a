//! Shared constants for end-to-end tests
//!
//! When test data changes (user handles, tokens, the job secret), update only
//! this file.

// ============================================================================
// Test Users
// ============================================================================

/// Regular test user handle
pub const TEST_USER: &str = "testuser";

/// Session token of the regular test user
pub const TEST_USER_TOKEN: &str = "testuser-session-token";

/// Admin test user handle
pub const ADMIN_USER: &str = "admin";

/// Session token of the admin test user
pub const ADMIN_TOKEN: &str = "admin-session-token";

// ============================================================================
// Jobs
// ============================================================================

/// Secret the test server is configured with
pub const JOB_SECRET: &str = "test-job-secret";

/// Id of the overdue prompts reminder job
pub const REMIND_PROMPTS_JOB: &str = "remind-prompts";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
