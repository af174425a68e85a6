use serde::{Deserialize, Serialize};

use super::CategoryId;

/// Categorises ledger activity for planning and dashboard buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Higher level grouping shown on dashboards (e.g. "Essentials").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_group: Option<String>,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            strategic_group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.strategic_group = Some(group.into());
        self
    }
}
