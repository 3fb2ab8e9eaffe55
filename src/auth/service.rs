use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{Config, MAX_SESSION_TTL_DAYS};
use crate::db::{
    DbPool, PublicUser, Session, UpdateProfileRequest, User, UserRole,
};

use super::{AuthError, CredentialHasher, SessionCookies};

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(PublicUser),
    Anonymous,
}

impl Identity {
    pub fn user(&self) -> Option<&PublicUser> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous => None,
        }
    }

    pub fn into_user(self) -> Option<PublicUser> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        self.user().map(PublicUser::is_admin).unwrap_or(false)
    }
}

/// Registration, login, logout and current-user resolution over the
/// `users` and `sessions` tables
#[derive(Debug, Clone)]
pub struct AuthService {
    db: DbPool,
    hasher: CredentialHasher,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(db: DbPool, hasher: CredentialHasher, session_ttl: Duration) -> Self {
        Self {
            db,
            hasher,
            session_ttl,
        }
    }

    pub fn from_config(db: DbPool, config: &Config) -> Result<Self, AuthError> {
        let days = config.auth.session_ttl_days;
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&days) {
            return Err(AuthError::SessionLifetime);
        }
        let hasher = CredentialHasher::new(config.auth.hash_memory_kib, config.auth.hash_iterations)?;
        Ok(Self::new(db, hasher, Duration::days(days)))
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Insert a user row without touching sessions
    pub(crate) async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<PublicUser, AuthError> {
        if self.email_in_use(email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hasher.hash(password)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await
        .map_err(AuthError::from_user_write)?;

        Ok(PublicUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
        })
    }

    /// Replace every session of the user with a fresh one and hand its token to the client
    async fn start_session(
        &self,
        cookies: &mut SessionCookies,
        user_id: &str,
    ) -> Result<(), AuthError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.session_ttl)
            .ok_or(AuthError::SessionLifetime)?;

        // One active session per user
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        let token = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(expires_at.to_rfc3339())
            .execute(&self.db)
            .await?;

        cookies.set_token(&token);
        Ok(())
    }

    /// Create an account and log it in
    pub async fn register(
        &self,
        cookies: &mut SessionCookies,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<PublicUser, AuthError> {
        let user = self.create_user(name, email, password, role).await?;
        self.start_session(cookies, &user.id).await?;

        info!(user_id = %user.id, email = %user.email, "Registered user");
        Ok(user)
    }

    /// Check credentials and start a new session, ending any previous one.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn login(
        &self,
        cookies: &mut SessionCookies,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        let Some(user) = user else {
            self.hasher.verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(cookies, &user.id).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(PublicUser::from(user))
    }

    /// End the current session. Never fails: a missing or undeletable
    /// session row still results in the cookie being cleared.
    pub async fn logout(&self, cookies: &mut SessionCookies) {
        if let Some(token) = cookies.token() {
            if let Err(e) = sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(&token)
                .execute(&self.db)
                .await
            {
                warn!(error = %e, "Failed to delete session on logout");
            }
        }
        cookies.clear();
    }

    /// Resolve the session cookie, surfacing store errors.
    ///
    /// The only side effect is removing an expired session and its cookie.
    pub async fn resolve(&self, cookies: &mut SessionCookies) -> Result<Identity, AuthError> {
        let Some(token) = cookies.token() else {
            return Ok(Identity::Anonymous);
        };

        let session: Option<Session> = sqlx::query_as("SELECT * FROM sessions WHERE id = ?")
            .bind(&token)
            .fetch_optional(&self.db)
            .await?;

        let Some(session) = session else {
            return Ok(Identity::Anonymous);
        };

        if session.is_expired() {
            if let Err(e) = sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(&session.id)
                .execute(&self.db)
                .await
            {
                warn!(error = %e, "Failed to delete expired session");
            }
            cookies.clear();
            return Ok(Identity::Anonymous);
        }

        let user: Option<PublicUser> =
            sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = ?")
                .bind(&session.user_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(user.map(Identity::Authenticated).unwrap_or(Identity::Anonymous))
    }

    /// The logged-in user, or `Anonymous` when identity cannot be determined
    pub async fn current_user(&self, cookies: &mut SessionCookies) -> Identity {
        match self.resolve(cookies).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Could not resolve session, treating request as anonymous");
                Identity::Anonymous
            }
        }
    }

    pub async fn check_authenticated(&self, cookies: &mut SessionCookies) -> bool {
        self.current_user(cookies).await.is_authenticated()
    }

    pub async fn check_is_admin(&self, cookies: &mut SessionCookies) -> bool {
        self.current_user(cookies).await.is_admin()
    }

    /// The current user, or `Unauthenticated`
    pub async fn require_user(&self, cookies: &mut SessionCookies) -> Result<PublicUser, AuthError> {
        self.current_user(cookies)
            .await
            .into_user()
            .ok_or(AuthError::Unauthenticated)
    }

    /// The current user if they are an admin; anonymous callers and regular
    /// users get the same `Unauthorized`
    pub async fn require_admin(&self, cookies: &mut SessionCookies) -> Result<PublicUser, AuthError> {
        match self.current_user(cookies).await {
            Identity::Authenticated(user) if user.is_admin() => Ok(user),
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Partially update the current user's name and email
    pub async fn update_profile(
        &self,
        cookies: &mut SessionCookies,
        update: UpdateProfileRequest,
    ) -> Result<PublicUser, AuthError> {
        let user = self.require_user(cookies).await?;

        if let Some(email) = update.email.as_deref() {
            if email != user.email && self.email_in_use(email).await? {
                return Err(AuthError::EmailTaken);
            }
        }

        sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email) WHERE id = ?",
        )
        .bind(update.name.as_deref())
        .bind(update.email.as_deref())
        .bind(&user.id)
        .execute(&self.db)
        .await
        .map_err(AuthError::from_user_write)?;

        let updated: Option<PublicUser> =
            sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = ?")
                .bind(&user.id)
                .fetch_optional(&self.db)
                .await?;

        updated.ok_or_else(|| AuthError::NotFound("User".to_string()))
    }
}
