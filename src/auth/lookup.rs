//! Read-only user lookups for collaborators (messaging, team invites).

use tracing::warn;

use crate::db::{DbPool, PublicUser};

use super::AuthError;

/// Public fields of a user by id; lookup errors read as "no such user"
pub async fn get_user_by_id(db: &DbPool, user_id: &str) -> Option<PublicUser> {
    let result = sqlx::query_as::<_, PublicUser>("SELECT id, name, email, role FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await;

    match result {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, user_id = %user_id, "User lookup failed");
            None
        }
    }
}

/// Exact, case-sensitive email match
pub async fn find_user_by_email(db: &DbPool, email: &str) -> Result<Option<PublicUser>, AuthError> {
    let user = sqlx::query_as::<_, PublicUser>("SELECT id, name, email, role FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(user)
}
