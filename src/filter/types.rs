use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completion-state filter for list queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl CompletionFilter {
    /// Lenient parse: anything other than `completed` / `pending` means all
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("completed") => CompletionFilter::Completed,
            Some("pending") => CompletionFilter::Pending,
            _ => CompletionFilter::All,
        }
    }

    /// The `is_completed` value this filter pins, if any
    pub fn is_completed(self) -> Option<bool> {
        match self {
            CompletionFilter::All => None,
            CompletionFilter::Completed => Some(true),
            CompletionFilter::Pending => Some(false),
        }
    }
}

/// Raw list query string as received over HTTP.
///
/// Everything is kept as text so malformed numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// Collect from decoded query pairs; the first occurrence of a key wins
    /// and unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "filter" => &mut params.filter,
                "search" => &mut params.search,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// Resolved LIMIT/OFFSET window. `limit == None` returns the whole set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Pagination {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// skip = max(0, page - 1) * limit, only when limit is positive
    pub fn from_page(page: i64, limit: i64) -> Self {
        if limit <= 0 {
            return Self::unlimited();
        }
        let offset = page.saturating_sub(1).max(0).saturating_mul(limit);
        Self { limit: Some(limit), offset }
    }

    /// Shrink the page size to `max` without moving the window start
    pub fn capped(self, max: i64) -> Self {
        match self.limit {
            Some(limit) if limit > max => Self { limit: Some(max), ..self },
            _ => self,
        }
    }
}

/// Typed bind parameter for generated SQL
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Uuid(Uuid),
    Bool(bool),
    Text(String),
    Int(i64),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
