use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

use crate::auth::{AuthError, Identity, SessionCookies};
use crate::db::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse, UserRole};
use crate::AppState;

use super::error::ApiError;
use super::validation::{validate_profile_request, validate_register_request};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAdminResponse {
    pub is_admin: bool,
}

/// Every handler gets the request's session cookie through this extractor
impl FromRequestParts<Arc<AppState>> for SessionCookies {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.session_cookies(CookieJar::from_headers(&parts.headers)))
    }
}

/// Send the response together with any cookie changes the auth core made
pub(crate) fn respond<T: IntoResponse>(
    cookies: SessionCookies,
    result: Result<T, AuthError>,
) -> Response {
    let jar = cookies.into_jar();
    match result {
        Ok(value) => (jar, value).into_response(),
        Err(e) => (jar, ApiError::from(e)).into_response(),
    }
}

/// Register endpoint; the new account is logged in immediately
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Json(request): Json<RegisterRequest>,
) -> Response {
    if let Err(e) = validate_register_request(&request) {
        return e.into_response();
    }

    let result = state
        .auth
        .register(
            &mut cookies,
            &request.name,
            &request.email,
            &request.password,
            UserRole::User,
        )
        .await
        .map(|user| (StatusCode::CREATED, Json(UserResponse { user })));

    respond(cookies, result)
}

/// Login endpoint
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Json(request): Json<LoginRequest>,
) -> Response {
    let result = state
        .auth
        .login(&mut cookies, &request.email, &request.password)
        .await
        .map(|user| Json(UserResponse { user }));

    respond(cookies, result)
}

/// Logout endpoint; always clears the cookie and sends the client home
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<Arc<AppState>>, mut cookies: SessionCookies) -> Response {
    state.auth.logout(&mut cookies).await;
    (cookies.into_jar(), Redirect::to("/")).into_response()
}

/// Current user
///
/// GET /api/auth/me
pub async fn me(State(state): State<Arc<AppState>>, mut cookies: SessionCookies) -> Response {
    let result = match state.auth.current_user(&mut cookies).await {
        Identity::Authenticated(user) => Ok(Json(UserResponse { user })),
        Identity::Anonymous => Err(AuthError::Unauthenticated),
    };
    respond(cookies, result)
}

/// GET /api/auth/check-admin
pub async fn check_admin(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
) -> Response {
    let is_admin = state.auth.check_is_admin(&mut cookies).await;
    (cookies.into_jar(), Json(CheckAdminResponse { is_admin })).into_response()
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    mut cookies: SessionCookies,
    Json(request): Json<UpdateProfileRequest>,
) -> Response {
    if let Err(e) = validate_profile_request(&request) {
        return e.into_response();
    }

    let result = state
        .auth
        .update_profile(&mut cookies, request)
        .await
        .map(|user| Json(UserResponse { user }));

    respond(cookies, result)
}
