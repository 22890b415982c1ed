use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "telegram_id")]
    pub external_id: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    #[serde(rename = "telegram_id")]
    pub external_id: String,
}

/// Identity of the signed-in user, passed explicitly into every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: i64,
    pub session_key: String,
}

impl SessionContext {
    pub fn new(user_id: i64, session_key: impl Into<String>) -> Self {
        Self {
            user_id,
            session_key: session_key.into(),
        }
    }
}
