use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{find_user_by_email, get_user_by_id, AuthError, SessionCookies};
use crate::db::UserResponse;
use crate::AppState;

use super::auth::respond;
use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub email: Option<String>,
}

/// Look up a user by exact email, e.g. when adding a team member
///
/// GET /api/users/search?email=
pub async fn search_by_email(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Query(query): Query<SearchQuery>,
) -> Response {
    if let Err(e) = state.auth.require_user(&mut cookies).await {
        return respond::<Json<UserResponse>>(cookies, Err(e));
    }

    let Some(email) = query.email.filter(|e| !e.trim().is_empty()) else {
        return (cookies.into_jar(), ApiError::bad_request("Email is required")).into_response();
    };

    let result = match find_user_by_email(&state.db, &email).await {
        Ok(Some(user)) => Ok(Json(UserResponse { user })),
        Ok(None) => Err(AuthError::NotFound("User".to_string())),
        Err(e) => Err(e),
    };
    respond(cookies, result)
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Path(id): Path<String>,
) -> Response {
    if let Err(e) = state.auth.require_user(&mut cookies).await {
        return respond::<Json<UserResponse>>(cookies, Err(e));
    }

    let result = get_user_by_id(&state.db, &id)
        .await
        .map(|user| Json(UserResponse { user }))
        .ok_or_else(|| AuthError::NotFound("User".to_string()));
    respond(cookies, result)
}
