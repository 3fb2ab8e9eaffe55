use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SystemSetting {
    pub id: String,
    pub category: String,
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

/// Settings of one category, keyed by setting name
pub type SettingsMap = BTreeMap<String, String>;
