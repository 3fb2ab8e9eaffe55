use tracing::info;

use crate::auth::{AuthError, AuthService, SessionCookies};
use crate::db::{DbPool, UserRole, UserSummary};

/// All users, oldest first
pub async fn list_users(
    auth: &AuthService,
    cookies: &mut SessionCookies,
) -> Result<Vec<UserSummary>, AuthError> {
    auth.require_admin(cookies).await?;

    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, name, email, role, created_at FROM users ORDER BY created_at ASC, rowid ASC",
    )
    .fetch_all(auth.db())
    .await?;

    Ok(users)
}

pub async fn admin_count(db: &DbPool) -> Result<i64, AuthError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn user_count(db: &DbPool) -> Result<i64, AuthError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// True only for an existing admin who is the sole admin left
pub async fn is_last_admin(db: &DbPool, user_id: &str) -> Result<bool, AuthError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    match role.map(UserRole::from) {
        Some(UserRole::Admin) => Ok(admin_count(db).await? <= 1),
        _ => Ok(false),
    }
}

/// Change another user's role. Admins cannot change their own role, and the
/// last admin cannot be demoted.
pub async fn update_user_role(
    auth: &AuthService,
    cookies: &mut SessionCookies,
    user_id: &str,
    new_role: UserRole,
) -> Result<(), AuthError> {
    let admin = auth.require_admin(cookies).await?;

    if user_id == admin.id {
        return Err(AuthError::CannotChangeOwnRole);
    }

    if new_role == UserRole::User && is_last_admin(auth.db(), user_id).await? {
        return Err(AuthError::LastAdmin);
    }

    let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(new_role.as_str())
        .bind(user_id)
        .execute(auth.db())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::NotFound("User".to_string()));
    }

    info!(admin_id = %admin.id, user_id = %user_id, role = %new_role, "Changed user role");
    Ok(())
}

/// Delete another user; their sessions go with them
pub async fn delete_user(
    auth: &AuthService,
    cookies: &mut SessionCookies,
    user_id: &str,
) -> Result<(), AuthError> {
    let admin = auth.require_admin(cookies).await?;

    if user_id == admin.id {
        return Err(AuthError::CannotDeleteSelf);
    }

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(auth.db())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::NotFound("User".to_string()));
    }

    info!(admin_id = %admin.id, user_id = %user_id, "Deleted user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::tests::{cookies_with, fresh_cookies, register, test_service};

    #[tokio::test]
    async fn test_list_users_requires_admin() {
        let auth = test_service().await;
        let (_, user_token) = register(&auth, "Alice", "alice@example.com", UserRole::User).await;
        let (_, admin_token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        assert!(matches!(
            list_users(&auth, &mut fresh_cookies()).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            list_users(&auth, &mut cookies_with(&user_token)).await,
            Err(AuthError::Unauthorized)
        ));

        let users = list_users(&auth, &mut cookies_with(&admin_token)).await.unwrap();
        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["alice@example.com", "root@example.com"]);
    }

    #[tokio::test]
    async fn test_update_role() {
        let auth = test_service().await;
        let (alice, alice_token) = register(&auth, "Alice", "alice@example.com", UserRole::User).await;
        let (_, admin_token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        update_user_role(&auth, &mut cookies_with(&admin_token), &alice.id, UserRole::Admin)
            .await
            .unwrap();

        assert!(auth.check_is_admin(&mut cookies_with(&alice_token)).await);
        assert_eq!(admin_count(auth.db()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cannot_change_own_role() {
        let auth = test_service().await;
        let (root, admin_token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        let result =
            update_user_role(&auth, &mut cookies_with(&admin_token), &root.id, UserRole::User).await;
        assert!(matches!(result, Err(AuthError::CannotChangeOwnRole)));
    }

    #[tokio::test]
    async fn test_update_role_unknown_user() {
        let auth = test_service().await;
        let (_, admin_token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        let result =
            update_user_role(&auth, &mut cookies_with(&admin_token), "missing", UserRole::Admin).await;
        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_is_last_admin() {
        let auth = test_service().await;
        let (alice, _) = register(&auth, "Alice", "alice@example.com", UserRole::User).await;
        let (root, _) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        assert!(is_last_admin(auth.db(), &root.id).await.unwrap());
        assert!(!is_last_admin(auth.db(), &alice.id).await.unwrap());
        assert!(!is_last_admin(auth.db(), "missing").await.unwrap());

        let (second, _) = register(&auth, "Second", "second@example.com", UserRole::Admin).await;
        assert!(!is_last_admin(auth.db(), &root.id).await.unwrap());
        assert!(!is_last_admin(auth.db(), &second.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_demoting_other_admin() {
        let auth = test_service().await;
        let (_, root_token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;
        let (second, _) = register(&auth, "Second", "second@example.com", UserRole::Admin).await;

        update_user_role(&auth, &mut cookies_with(&root_token), &second.id, UserRole::User)
            .await
            .unwrap();
        assert_eq!(admin_count(auth.db()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_cascades_sessions() {
        let auth = test_service().await;
        let (alice, alice_token) = register(&auth, "Alice", "alice@example.com", UserRole::User).await;
        let (_, admin_token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        delete_user(&auth, &mut cookies_with(&admin_token), &alice.id).await.unwrap();

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
            .bind(&alice.id)
            .fetch_one(auth.db())
            .await
            .unwrap();
        assert_eq!(sessions, 0);
        assert!(!auth.check_authenticated(&mut cookies_with(&alice_token)).await);
        assert_eq!(user_count(auth.db()).await.unwrap(), 1);

        let again = delete_user(&auth, &mut cookies_with(&admin_token), &alice.id).await;
        assert!(matches!(again, Err(AuthError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let auth = test_service().await;
        let (root, admin_token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        let result = delete_user(&auth, &mut cookies_with(&admin_token), &root.id).await;
        assert!(matches!(result, Err(AuthError::CannotDeleteSelf)));
    }

    #[tokio::test]
    async fn test_regular_user_cannot_delete() {
        let auth = test_service().await;
        let (_, alice_token) = register(&auth, "Alice", "alice@example.com", UserRole::User).await;
        let (bob, _) = register(&auth, "Bob", "bob@example.com", UserRole::User).await;

        let result = delete_user(&auth, &mut cookies_with(&alice_token), &bob.id).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }
}
