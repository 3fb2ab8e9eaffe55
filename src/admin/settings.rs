use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AuthError, AuthService, SessionCookies};
use crate::db::{DbPool, SettingsMap, SystemSetting};

/// All settings in a category as a key/value map
pub async fn get_system_settings(
    auth: &AuthService,
    cookies: &mut SessionCookies,
    category: &str,
) -> Result<SettingsMap, AuthError> {
    auth.require_admin(cookies).await?;

    let settings = sqlx::query_as::<_, SystemSetting>(
        "SELECT * FROM system_settings WHERE category = ?",
    )
    .bind(category)
    .fetch_all(auth.db())
    .await?;

    Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
}

async fn upsert_setting(db: &DbPool, category: &str, key: &str, value: &str) -> Result<(), AuthError> {
    sqlx::query(
        r#"
        INSERT INTO system_settings (id, category, key, value, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(category, key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(category)
    .bind(key)
    .bind(value)
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await?;
    Ok(())
}

/// Create or overwrite one setting
pub async fn update_system_setting(
    auth: &AuthService,
    cookies: &mut SessionCookies,
    category: &str,
    key: &str,
    value: &str,
) -> Result<(), AuthError> {
    auth.require_admin(cookies).await?;
    upsert_setting(auth.db(), category, key, value).await
}

/// Create or overwrite every setting in `settings`; keys not listed are left alone
pub async fn update_system_settings(
    auth: &AuthService,
    cookies: &mut SessionCookies,
    category: &str,
    settings: &SettingsMap,
) -> Result<(), AuthError> {
    auth.require_admin(cookies).await?;
    for (key, value) in settings {
        upsert_setting(auth.db(), category, key, value).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::tests::{cookies_with, register, test_service};
    use crate::db::UserRole;

    #[tokio::test]
    async fn test_upsert_and_read() {
        let auth = test_service().await;
        let (_, token) = register(&auth, "Root", "root@example.com", UserRole::Admin).await;

        update_system_setting(&auth, &mut cookies_with(&token), "general", "site_name", "Planboard")
            .await
            .unwrap();

        let mut batch = SettingsMap::new();
        batch.insert("site_name".to_string(), "Planboard HQ".to_string());
        batch.insert("timezone".to_string(), "UTC".to_string());
        update_system_settings(&auth, &mut cookies_with(&token), "general", &batch)
            .await
            .unwrap();

        update_system_setting(&auth, &mut cookies_with(&token), "email", "sender", "noreply@example.com")
            .await
            .unwrap();

        let general = get_system_settings(&auth, &mut cookies_with(&token), "general")
            .await
            .unwrap();
        assert_eq!(general, batch);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM system_settings")
            .fetch_one(auth.db())
            .await
            .unwrap();
        assert_eq!(rows, 3);
    }

    #[tokio::test]
    async fn test_settings_require_admin() {
        let auth = test_service().await;
        let (_, token) = register(&auth, "Alice", "alice@example.com", UserRole::User).await;

        let read = get_system_settings(&auth, &mut cookies_with(&token), "general").await;
        assert!(matches!(read, Err(AuthError::Unauthorized)));

        let write =
            update_system_setting(&auth, &mut cookies_with(&token), "general", "site_name", "x").await;
        assert!(matches!(write, Err(AuthError::Unauthorized)));
    }
}
