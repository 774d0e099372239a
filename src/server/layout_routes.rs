//! Data loaders for the web client's layouts.

use super::role_guard::require_role;
use super::session::Session;
use super::state::ServerState;
use crate::user::UserRole;
use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

/// Areas of the admin UI, in display order.
const ADMIN_SECTIONS: &[&str] = &["prompts", "users", "jobs"];

#[derive(Serialize)]
struct LayoutUser {
    id: usize,
    handle: String,
    roles: Vec<UserRole>,
}

impl From<&Session> for LayoutUser {
    fn from(session: &Session) -> Self {
        LayoutUser {
            id: session.user_id,
            handle: session.handle.clone(),
            roles: session.roles.clone(),
        }
    }
}

#[derive(Serialize)]
struct LayoutData {
    user: Option<LayoutUser>,
}

#[derive(Serialize)]
struct AdminLayoutData {
    user: LayoutUser,
    sections: &'static [&'static str],
}

async fn get_layout(session: Option<Session>) -> Json<LayoutData> {
    Json(LayoutData {
        user: session.as_ref().map(LayoutUser::from),
    })
}

async fn get_admin_layout(session: Option<Session>) -> Response {
    match require_role(session.as_ref(), UserRole::Admin) {
        Ok(session) => Json(AdminLayoutData {
            user: LayoutUser::from(session),
            sections: ADMIN_SECTIONS,
        })
        .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

pub fn make_layout_routes(state: ServerState) -> Router {
    Router::new()
        .route("/layout", get(get_layout))
        .route("/admin/layout", get(get_admin_layout))
        .with_state(state)
}
