pub mod admin;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;

pub use db::DbPool;

use axum_extra::extract::cookie::CookieJar;
use config::Config;

use crate::auth::{AuthError, AuthService, CookiePolicy, SessionCookies};

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub auth: AuthService,
    pub cookie_policy: CookiePolicy,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Result<Self, AuthError> {
        let auth = AuthService::from_config(db.clone(), &config)?;
        let cookie_policy = CookiePolicy::from_config(&config);
        Ok(Self {
            config,
            db,
            auth,
            cookie_policy,
        })
    }

    /// Wrap a request's cookies for the auth core
    pub fn session_cookies(&self, jar: CookieJar) -> SessionCookies {
        SessionCookies::new(jar, self.cookie_policy.clone())
    }
}
