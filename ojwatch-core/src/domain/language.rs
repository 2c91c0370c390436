//! Language domain types

use serde::{Deserialize, Serialize};

/// A programming language the judge accepts submissions in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// 1 when the language is enabled on the judge
    pub status: Option<i32>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl Language {
    /// Whether the judge currently accepts submissions in this language
    pub fn is_enabled(&self) -> bool {
        self.status.is_none_or(|s| s == 1)
    }
}
