//! Admin console operations: user management and system settings.
//!
//! Every operation first requires an admin caller through
//! [`AuthService::require_admin`](crate::auth::AuthService::require_admin).

mod settings;
mod users;

pub use settings::{get_system_settings, update_system_setting, update_system_settings};
pub use users::{admin_count, delete_user, is_last_admin, list_users, update_user_role, user_count};
