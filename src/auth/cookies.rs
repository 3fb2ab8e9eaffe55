use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::{Config, MAX_SESSION_TTL_DAYS};

/// Attributes of the session cookie
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub name: String,
    /// Only set in production; browsers drop secure cookies over plain HTTP
    pub secure: bool,
    pub max_age: time::Duration,
}

impl CookiePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.auth.cookie_name.clone(),
            secure: config.server.environment.is_production(),
            max_age: time::Duration::days(
                config.auth.session_ttl_days.clamp(0, MAX_SESSION_TTL_DAYS),
            ),
        }
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Request-scoped read/write access to the session cookie.
///
/// Wraps the request's [`CookieJar`]; handlers hand the jar back in their
/// response so any change made here reaches the client.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    jar: CookieJar,
    policy: CookiePolicy,
}

impl SessionCookies {
    pub fn new(jar: CookieJar, policy: CookiePolicy) -> Self {
        Self { jar, policy }
    }

    /// The session token sent by the client, if any
    pub fn token(&self) -> Option<String> {
        self.jar
            .get(&self.policy.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn set_token(&mut self, token: &str) {
        let cookie = Cookie::build((self.policy.name.clone(), token.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.policy.secure)
            .same_site(SameSite::Lax)
            .max_age(self.policy.max_age)
            .build();
        self.jar = self.jar.clone().add(cookie);
    }

    /// Remove the session cookie from the client
    pub fn clear(&mut self) {
        let removal = Cookie::build((self.policy.name.clone(), "")).path("/").build();
        self.jar = self.jar.clone().remove(removal);
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

/// A jar as the server sees it when the client sends `name=token`
#[cfg(test)]
pub(crate) fn incoming_jar(name: &str, token: &str) -> CookieJar {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        axum::http::header::COOKIE,
        format!("{}={}", name, token).parse().unwrap(),
    );
    CookieJar::from_headers(&headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_set_token_attributes() {
        let mut cookies = SessionCookies::new(CookieJar::new(), CookiePolicy::default());
        cookies.set_token("abc");

        let cookie = cookies.jar().get("session_id").unwrap();
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
        assert_ne!(cookie.secure(), Some(true));
        assert_eq!(cookies.token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_secure_only_in_production() {
        let mut config = Config::default();
        config.server.environment = Environment::Production;

        let mut cookies = SessionCookies::new(CookieJar::new(), CookiePolicy::from_config(&config));
        cookies.set_token("abc");
        assert_eq!(cookies.jar().get("session_id").unwrap().secure(), Some(true));
    }

    #[test]
    fn test_clear_removes_token() {
        let jar = incoming_jar("session_id", "abc");
        let mut cookies = SessionCookies::new(jar, CookiePolicy::default());
        assert!(cookies.token().is_some());

        cookies.clear();
        assert!(cookies.token().is_none());

        // Clearing twice is harmless
        cookies.clear();
        assert!(cookies.token().is_none());
    }

    #[test]
    fn test_ignores_other_cookies() {
        let jar = incoming_jar("theme", "dark");
        let cookies = SessionCookies::new(jar, CookiePolicy::default());
        assert!(cookies.token().is_none());
    }
}
