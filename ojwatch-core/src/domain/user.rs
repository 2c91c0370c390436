//! User domain types

use serde::{Deserialize, Serialize};

/// A registered user of the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub create_time: Option<String>,
}
