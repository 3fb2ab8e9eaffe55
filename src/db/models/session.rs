//! Login session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Opaque token, also the value of the session cookie
    pub id: String,
    pub user_id: String,
    /// RFC 3339, fixed at creation
    pub expires_at: String,
}

impl Session {
    /// Whether the session is past its absolute expiry.
    ///
    /// A timestamp that fails to parse counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => expires_at.with_timezone(&Utc) <= now,
            Err(_) => true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session_expiring(at: DateTime<Utc>) -> Session {
        Session {
            id: "token".to_string(),
            user_id: "user".to_string(),
            expires_at: at.to_rfc3339(),
        }
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        assert!(!session_expiring(now + Duration::days(7)).is_expired_at(now));
        assert!(session_expiring(now - Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn test_garbled_expiry_is_expired() {
        let session = Session {
            id: "token".to_string(),
            user_id: "user".to_string(),
            expires_at: "next tuesday".to_string(),
        };
        assert!(session.is_expired());
    }
}
