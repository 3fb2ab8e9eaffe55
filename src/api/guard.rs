use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::AppState;

pub const ADMIN_PREFIX: &str = "/dashboard/admin";

/// Keep non-admins out of the admin pages.
///
/// Requests without a session cookie go to `/login`. A cookie that does not
/// resolve to an admin sends the caller back to `/dashboard`. Everything
/// outside the admin prefix passes through untouched.
pub async fn admin_guard(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with(ADMIN_PREFIX) {
        return next.run(request).await;
    }

    let mut cookies = state.session_cookies(CookieJar::from_headers(request.headers()));
    if cookies.token().is_none() {
        return Redirect::to("/login").into_response();
    }

    if !state.auth.check_is_admin(&mut cookies).await {
        tracing::debug!(path = %request.uri().path(), "Admin page refused");
        return (cookies.into_jar(), Redirect::to("/dashboard")).into_response();
    }

    next.run(request).await
}
