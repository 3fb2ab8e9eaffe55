mod admin;
pub mod auth;
pub mod error;
pub mod guard;
mod users;
pub mod validation;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use error::{ApiError, ErrorCode};

/// Build the HTTP surface. When `static_dir` is given, unmatched paths are
/// served from it with an `index.html` fallback for client-side routing.
pub fn create_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/check-admin", get(auth::check_admin))
        .route("/profile", put(auth::update_profile));

    let user_routes = Router::new()
        .route("/search", get(users::search_by_email))
        .route("/{id}", get(users::get_user));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::update_role))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/stats", get(admin::stats))
        .route(
            "/settings/{category}",
            get(admin::get_settings).put(admin::update_settings),
        );

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes);

    let router = match static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))),
        ),
        None => router.fallback(not_found),
    };

    router
        .layer(middleware::from_fn_with_state(state.clone(), guard::admin_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
