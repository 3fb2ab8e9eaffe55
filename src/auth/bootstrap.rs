use tracing::info;

use crate::db::UserRole;

use super::{AuthError, AuthService};

/// Seed an admin account when none exists.
///
/// Skipped if any admin is present or the email is already taken by a regular
/// account. Returns whether an account was created. No session is started.
pub async fn ensure_initial_admin(
    auth: &AuthService,
    name: &str,
    email: &str,
    password: &str,
) -> Result<bool, AuthError> {
    let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(auth.db())
        .await?;

    if admin_count > 0 {
        return Ok(false);
    }

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(auth.db())
        .await?;

    if existing > 0 {
        info!(email = %email, "Bootstrap admin email already belongs to a user, skipping");
        return Ok(false);
    }

    auth.create_user(name, email, password, UserRole::Admin).await?;
    info!(email = %email, "Created initial admin user");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::tests::{fresh_cookies, register, test_service};

    #[tokio::test]
    async fn test_creates_admin_once() {
        let auth = test_service().await;

        assert!(ensure_initial_admin(&auth, "Admin", "admin@example.com", "admin123").await.unwrap());
        assert!(!ensure_initial_admin(&auth, "Admin", "admin@example.com", "admin123").await.unwrap());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(auth.db())
            .await
            .unwrap();
        assert_eq!(count, 1);

        // Seeded account can log in and does not get a session up front
        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(auth.db())
            .await
            .unwrap();
        assert_eq!(sessions, 0);

        let mut cookies = fresh_cookies();
        let admin = auth.login(&mut cookies, "admin@example.com", "admin123").await.unwrap();
        assert_eq!(admin.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_skips_when_admin_exists() {
        let auth = test_service().await;
        register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        assert!(!ensure_initial_admin(&auth, "Admin", "admin@example.com", "admin123").await.unwrap());
    }

    #[tokio::test]
    async fn test_skips_when_email_taken_by_user() {
        let auth = test_service().await;
        register(&auth, "Squatter", "admin@example.com", UserRole::User).await;

        assert!(!ensure_initial_admin(&auth, "Admin", "admin@example.com", "admin123").await.unwrap());
    }
}
