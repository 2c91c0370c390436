//! Submission DTOs

use serde::{Deserialize, Serialize};

use super::page::PageQuery;

/// Code submitted for judging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCode {
    pub problem_id: i64,
    pub language_id: i64,
    pub code: String,
}

/// Filters for the submission list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}
