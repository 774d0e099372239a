use super::session::Session;
use crate::user::UserRole;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
pub enum RoleGuardRejection {
    /// No identity could be resolved for the request.
    Unauthenticated,
    /// The caller is known but lacks the required role.
    Forbidden,
}

impl IntoResponse for RoleGuardRejection {
    fn into_response(self) -> Response {
        match self {
            RoleGuardRejection::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            RoleGuardRejection::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// Halts the request unless the caller has `role`.
///
/// Handlers call this before doing any role-restricted work.
pub fn require_role(
    session: Option<&Session>,
    role: UserRole,
) -> Result<&Session, RoleGuardRejection> {
    let session = session.ok_or(RoleGuardRejection::Unauthenticated)?;
    if !session.has_role(role) {
        debug!(
            "user_id={} lacks role {}, has {:?}",
            session.user_id, role, session.roles
        );
        return Err(RoleGuardRejection::Forbidden);
    }
    Ok(session)
}
