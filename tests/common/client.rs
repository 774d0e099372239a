//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint. When API routes change,
//! update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

/// HTTP test client, optionally carrying a session token
#[derive(Clone)]
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    session_token: Option<String>,
}

impl TestClient {
    /// Creates a new client without a session
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            session_token: None,
        }
    }

    /// Creates a client authenticated as the regular test user
    pub fn authenticated(base_url: String) -> Self {
        Self::new(base_url).with_session_token(TEST_USER_TOKEN)
    }

    /// Creates a client authenticated as the admin test user
    pub fn authenticated_admin(base_url: String) -> Self {
        Self::new(base_url).with_session_token(ADMIN_TOKEN)
    }

    pub fn with_session_token(mut self, token: &str) -> Self {
        self.session_token = Some(token.to_string());
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // ========================================================================
    // Jobs
    // ========================================================================

    /// GET /api/jobs/{job_id}?token={token}
    pub async fn trigger_job(&self, job_id: &str, token: Option<&str>) -> Response {
        let mut request = self.get(&format!("/api/jobs/{}", job_id));
        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }
        request.send().await.expect("Trigger job request failed")
    }

    /// GET /api/jobs/remind-prompts?token={token}
    pub async fn trigger_remind_prompts(&self, token: Option<&str>) -> Response {
        self.trigger_job(REMIND_PROMPTS_JOB, token).await
    }

    // ========================================================================
    // Layouts
    // ========================================================================

    /// GET /v1/layout
    pub async fn get_layout(&self) -> Response {
        self.get("/v1/layout")
            .send()
            .await
            .expect("Layout request failed")
    }

    /// GET /v1/admin/layout
    pub async fn get_admin_layout(&self) -> Response {
        self.get("/v1/admin/layout")
            .send()
            .await
            .expect("Admin layout request failed")
    }

    // ========================================================================
    // Client errors
    // ========================================================================

    /// POST /v1/client-errors
    pub async fn report_client_error(&self, report: &Value) -> Response {
        self.post("/v1/client-errors")
            .json(report)
            .send()
            .await
            .expect("Client error request failed")
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").send().await.expect("Home request failed")
    }
}
