//! Admin console endpoints. Every handler here requires an admin session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::admin;
use crate::auth::{AuthError, SessionCookies};
use crate::db::{SettingsMap, UpdateRoleRequest};
use crate::AppState;

use super::auth::respond;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub user_count: i64,
    pub admin_count: i64,
}

/// GET /api/admin/users
pub async fn list_users(State(state): State<Arc<AppState>>, mut cookies: SessionCookies) -> Response {
    let result = admin::list_users(&state.auth, &mut cookies).await.map(Json);
    respond(cookies, result)
}

/// PUT /api/admin/users/{id}/role
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Response {
    let result = admin::update_user_role(&state.auth, &mut cookies, &id, request.role)
        .await
        .map(|_| StatusCode::NO_CONTENT);
    respond(cookies, result)
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Path(id): Path<String>,
) -> Response {
    let result = admin::delete_user(&state.auth, &mut cookies, &id)
        .await
        .map(|_| StatusCode::NO_CONTENT);
    respond(cookies, result)
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<Arc<AppState>>, mut cookies: SessionCookies) -> Response {
    let result = async {
        state.auth.require_admin(&mut cookies).await?;
        Ok::<_, AuthError>(Json(AdminStats {
            user_count: admin::user_count(&state.db).await?,
            admin_count: admin::admin_count(&state.db).await?,
        }))
    }
    .await;
    respond(cookies, result)
}

/// GET /api/admin/settings/{category}
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Path(category): Path<String>,
) -> Response {
    let result = admin::get_system_settings(&state.auth, &mut cookies, &category)
        .await
        .map(Json);
    respond(cookies, result)
}

/// Upsert the given keys, then return the whole category
///
/// PUT /api/admin/settings/{category}
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Path(category): Path<String>,
    Json(settings): Json<SettingsMap>,
) -> Response {
    let result = async {
        admin::update_system_settings(&state.auth, &mut cookies, &category, &settings).await?;
        admin::get_system_settings(&state.auth, &mut cookies, &category).await
    }
    .await
    .map(Json);
    respond(cookies, result)
}
