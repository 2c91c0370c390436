//! Paging DTOs

use serde::{Deserialize, Serialize};

/// Page selector appended to list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number
    pub page_no: u32,
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_no: 1,
            page_size: 10,
        }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new", alias = "records")]
    pub list: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
