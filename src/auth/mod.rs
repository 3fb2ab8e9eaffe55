//! Session-cookie authentication.
//!
//! Every authenticated operation resolves the session cookie to a session row,
//! then to a user row, before the caller applies its own authorization rule.
//! Cookie access is passed in explicitly through [`SessionCookies`].

mod bootstrap;
mod cookies;
mod error;
mod lookup;
mod password;
pub(crate) mod service;

pub use bootstrap::ensure_initial_admin;
pub use cookies::{CookiePolicy, SessionCookies};
pub use error::AuthError;
pub use lookup::{find_user_by_email, get_user_by_id};
pub use password::CredentialHasher;
pub use service::{AuthService, Identity};
