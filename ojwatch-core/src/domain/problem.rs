//! Problem domain types

use serde::{Deserialize, Serialize};

/// A judge problem
///
/// List endpoints return a trimmed-down record, so everything except the
/// identity is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub input_description: Option<String>,
    pub output_description: Option<String>,
    pub sample_input: Option<String>,
    pub sample_output: Option<String>,
    pub hint: Option<String>,
    /// Time limit in milliseconds
    pub time_limit: Option<u64>,
    /// Memory limit in megabytes
    pub memory_limit: Option<u64>,
    pub difficulty: Option<i32>,
    pub accept_count: Option<u64>,
    pub submit_count: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub create_time: Option<String>,
}

impl Problem {
    /// Acceptance ratio in percent, if anything has been submitted
    pub fn acceptance_rate(&self) -> Option<f64> {
        match (self.accept_count, self.submit_count) {
            (Some(accepted), Some(submitted)) if submitted > 0 => {
                Some(accepted as f64 * 100.0 / submitted as f64)
            }
            _ => None,
        }
    }
}
