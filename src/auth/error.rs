use thiserror::Error;

/// Failures surfaced by the auth core and the admin console built on it
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("This email address is already in use")]
    EmailTaken,

    /// Deliberately the same for an unknown email and a wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("You are not authorized to perform this action")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("You cannot change your own role")]
    CannotChangeOwnRole,

    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    #[error("The last admin cannot be demoted")]
    LastAdmin,

    #[error("Session lifetime is out of range")]
    SessionLifetime,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl AuthError {
    /// Map an insert/update error, turning a unique-index hit on the email into `EmailTaken`
    pub(crate) fn from_user_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::EmailTaken,
            _ => AuthError::StoreUnavailable(err),
        }
    }
}
