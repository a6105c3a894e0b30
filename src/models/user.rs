use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Identity of an account holder. The password hash never leaves the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Machine the account was registered from, if the client reported one.
    pub pc_name: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, pc_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            pc_name,
            date_joined: Utc::now(),
        }
    }
}
