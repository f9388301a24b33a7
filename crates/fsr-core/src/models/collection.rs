//! Hydra collection envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A page of records as returned by list and query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T = Value> {
    /// The records in this page.
    #[serde(rename = "hydra:member", default = "Vec::new")]
    pub members: Vec<T>,

    /// Total number of matching records, when the server reports it.
    #[serde(
        rename = "hydra:totalItems",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_items: Option<u64>,
}

impl<T> Collection<T> {
    /// Returns true if the page holds no records.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Consume the page and return its first record.
    pub fn into_first(self) -> Option<T> {
        self.members.into_iter().next()
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            total_items: None,
        }
    }
}
