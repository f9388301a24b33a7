//! List query parameters.

/// Paging and filter parameters for list endpoints.
///
/// Serialised as `$limit`, `$page`, `$search` plus any field filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Maximum records per page.
    pub limit: Option<u32>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Free-text search.
    pub search: Option<String>,
    /// Field equality filters, e.g. `("status", "Open")`.
    pub filters: Vec<(String, String)>,
}

impl ListParams {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the search term.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Add a field filter.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        if let Some(limit) = self.limit {
            pairs.push(("$limit".to_string(), limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("$page".to_string(), page.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("$search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}
