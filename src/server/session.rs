//! Authentication context of a request.
//!
//! A `Session` is resolved from the `session_token` cookie or, failing that,
//! from the `Authorization` header. Handlers that require an identity take
//! `Session`; handlers that merely adapt to one take `Option<Session>`.

use super::state::ServerState;
use crate::user::{AuthTokenValue, UserRole, UserStore};

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: usize,
    pub handle: String,
    pub token: String,
    pub roles: Vec<UserRole>,
}

impl Session {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

#[derive(Debug)]
pub enum SessionExtractionError {
    Unauthenticated,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(|cookie| cookie.value().to_string())
}

fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?;
    let value = String::from_utf8_lossy(raw.as_bytes());
    let token = value.strip_prefix("Bearer ").unwrap_or(&value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolves a session token against the user store.
///
/// Store failures are logged and treated as "no session".
pub fn resolve_session(user_store: &dyn UserStore, token: String) -> Option<Session> {
    let token_value = AuthTokenValue(token);
    let auth_token = match user_store.get_auth_token(&token_value) {
        Ok(Some(auth_token)) => auth_token,
        Ok(None) => {
            debug!("Auth token not found");
            return None;
        }
        Err(e) => {
            warn!("Failed to look up auth token: {:#}", e);
            return None;
        }
    };

    if let Err(e) = user_store.update_auth_token_last_used(&token_value) {
        debug!("Failed to update auth token last_used timestamp: {}", e);
    }

    let handle = match user_store.get_user_handle(auth_token.user_id) {
        Ok(Some(handle)) => handle,
        Ok(None) => {
            debug!("Auth token points to missing user_id={}", auth_token.user_id);
            return None;
        }
        Err(e) => {
            warn!("Failed to look up user_id={}: {:#}", auth_token.user_id, e);
            return None;
        }
    };

    let roles = match user_store.get_user_roles(auth_token.user_id) {
        Ok(roles) => roles,
        Err(e) => {
            warn!(
                "Failed to resolve roles for user_id={}: {:#}",
                auth_token.user_id, e
            );
            return None;
        }
    };

    debug!(
        "Resolved session for user_id={} with roles {:?}",
        auth_token.user_id, roles
    );
    Some(Session {
        user_id: auth_token.user_id,
        handle,
        token: token_value.0,
        roles,
    })
}

fn extract_session_from_request_parts(parts: &Parts, ctx: &ServerState) -> Option<Session> {
    let token = extract_session_token_from_cookies(parts)
        .or_else(|| extract_session_token_from_headers(parts))?;
    resolve_session(ctx.user_store.as_ref(), token)
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
            .ok_or(SessionExtractionError::Unauthenticated)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_session_from_request_parts(parts, ctx))
    }
}
