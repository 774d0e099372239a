//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, JOB_SECRET};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_trigger() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.trigger_remind_prompts(Some(JOB_SECRET)).await;
//!     assert_eq!(response.status(), StatusCode::NO_CONTENT);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{add_prompt, RecordingNotifier};
#[allow(unused_imports)]
pub use server::{TestServer, TestServerOptions};
