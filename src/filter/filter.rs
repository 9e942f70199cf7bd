use uuid::Uuid;

use super::filter_where::FilterWhere;
use super::types::{CompletionFilter, ListParams, Pagination, SqlParam, SqlResult};
use crate::config::FilterConfig;
use crate::database::models::Todo;

const TABLE: &str = "todos";
const COLUMNS: &str = "\"id\", \"owner_id\", \"title\", \"description\", \"is_completed\", \"created_at\", \"updated_at\"";

/// Owner-scoped todo query: completion filter, title search and paging.
///
/// The same value drives both the SQL generated for PostgreSQL and the
/// in-memory predicate, so both stores agree on what a query means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFilter {
    pub owner_id: Uuid,
    pub completion: CompletionFilter,
    pub search: Option<String>,
    pub page: Pagination,
}

impl TodoFilter {
    /// Everything the owner has, newest first
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            completion: CompletionFilter::All,
            search: None,
            page: Pagination::unlimited(),
        }
    }

    /// Build from raw query params, falling back to defaults on bad input
    pub fn from_params(owner_id: Uuid, params: &ListParams, config: &FilterConfig) -> Self {
        let page = parse_int(params.page.as_deref()).unwrap_or(1);
        let limit = parse_int(params.limit.as_deref()).unwrap_or(0);

        // Offset always follows the requested limit; the cap only trims the page
        let mut window = Pagination::from_page(page, limit);
        if let Some(max_limit) = config.max_limit {
            if limit > max_limit {
                if config.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
                }
                window = window.capped(max_limit);
            }
        }

        Self::for_owner(owner_id)
            .completion(CompletionFilter::parse(params.filter.as_deref()))
            .search(params.search.as_deref().unwrap_or_default())
            .paginate(window)
    }

    pub fn completion(mut self, completion: CompletionFilter) -> Self {
        self.completion = completion;
        self
    }

    /// Empty search matches everything
    pub fn search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string()).filter(|s| !s.is_empty());
        self
    }

    pub fn paginate(mut self, page: Pagination) -> Self {
        self.page = page;
        self
    }

    /// Does `todo` satisfy owner, completion and search (paging aside)?
    pub fn matches(&self, todo: &Todo) -> bool {
        if !todo.is_owned_by(self.owner_id) {
            return false;
        }
        if let Some(done) = self.completion.is_completed() {
            if todo.is_completed != done {
                return false;
            }
        }
        match &self.search {
            Some(needle) => todo.title.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    fn where_clause(&self) -> FilterWhere {
        let mut w = FilterWhere::new();
        w.owner(self.owner_id);
        if let Some(done) = self.completion.is_completed() {
            w.completed(done);
        }
        if let Some(needle) = &self.search {
            w.title_contains(needle);
        }
        w
    }

    pub fn to_sql(&self) -> SqlResult {
        let w = self.where_clause();
        let mut next = w.next_index();
        let (where_clause, mut params) = w.finish();

        let mut query = format!(
            "SELECT {} FROM \"{}\" WHERE {} ORDER BY \"created_at\" DESC, \"seq\" DESC",
            COLUMNS, TABLE, where_clause
        );

        if let Some(limit) = self.page.limit {
            query.push_str(&format!(" LIMIT ${} OFFSET ${}", next, next + 1));
            next += 2;
            params.push(SqlParam::Int(limit));
            params.push(SqlParam::Int(self.page.offset));
        }
        debug_assert_eq!(next, params.len() + 1);

        SqlResult { query, params }
    }

    /// COUNT(*) over the same predicate; paging is ignored
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_clause().finish();
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", TABLE, where_clause),
            params,
        }
    }
}

fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|s| s.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn todo(owner: Uuid, title: &str, done: bool) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: title.to_string(),
            description: String::new(),
            is_completed: done,
            created_at: now,
            updated_at: now,
        }
    }

    fn params(filter: Option<&str>, search: Option<&str>, page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            filter: filter.map(str::to_string),
            search: search.map(str::to_string),
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    fn unlimited() -> FilterConfig {
        FilterConfig { max_limit: None, debug_logging: false }
    }

    #[test]
    fn defaults_when_params_missing_or_malformed() {
        let owner = Uuid::new_v4();
        let f = TodoFilter::from_params(owner, &params(None, None, Some("abc"), Some("x")), &unlimited());
        assert_eq!(f, TodoFilter::for_owner(owner));
    }

    #[test]
    fn extreme_page_numbers_do_not_overflow() {
        let owner = Uuid::new_v4();
        let f = TodoFilter::from_params(
            owner,
            &params(None, None, Some("-9223372036854775808"), Some("2")),
            &unlimited(),
        );
        assert_eq!(f.page, Pagination { limit: Some(2), offset: 0 });
    }

    #[test]
    fn parses_page_and_limit() {
        let owner = Uuid::new_v4();
        let f = TodoFilter::from_params(owner, &params(Some("pending"), Some(""), Some("2"), Some("2")), &unlimited());
        assert_eq!(f.completion, CompletionFilter::Pending);
        assert_eq!(f.search, None);
        assert_eq!(f.page, Pagination { limit: Some(2), offset: 2 });
    }

    #[test]
    fn caps_explicit_limit_to_configured_max() {
        let config = FilterConfig { max_limit: Some(50), debug_logging: true };
        let f = TodoFilter::from_params(Uuid::new_v4(), &params(None, None, None, Some("500")), &config);
        assert_eq!(f.page.limit, Some(50));

        // Page 2 of 200 still starts at item 201
        let f = TodoFilter::from_params(Uuid::new_v4(), &params(None, None, Some("2"), Some("200")), &config);
        assert_eq!(f.page, Pagination { limit: Some(50), offset: 200 });

        // Unlimited listing stays unlimited
        let f = TodoFilter::from_params(Uuid::new_v4(), &params(None, None, None, None), &config);
        assert_eq!(f.page.limit, None);
    }

    #[test]
    fn matches_owner_completion_and_search() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let f = TodoFilter::for_owner(owner).completion(CompletionFilter::Completed).search("MILK");
        assert!(f.matches(&todo(owner, "Buy milk", true)));
        assert!(!f.matches(&todo(owner, "Buy milk", false)));
        assert!(!f.matches(&todo(owner, "Buy bread", true)));
        assert!(!f.matches(&todo(other, "Buy milk", true)));
    }

    #[test]
    fn generates_select_with_paging() {
        let owner = Uuid::new_v4();
        let sql = TodoFilter::for_owner(owner)
            .completion(CompletionFilter::Pending)
            .search("a_b")
            .paginate(Pagination::from_page(3, 10))
            .to_sql();

        assert!(sql.query.starts_with("SELECT \"id\", \"owner_id\""));
        assert!(sql.query.contains("FROM \"todos\" WHERE \"owner_id\" = $1 AND \"is_completed\" = $2 AND \"title\" ILIKE $3"));
        assert!(sql.query.ends_with("ORDER BY \"created_at\" DESC, \"seq\" DESC LIMIT $4 OFFSET $5"));
        assert_eq!(
            sql.params,
            vec![
                SqlParam::Uuid(owner),
                SqlParam::Bool(false),
                SqlParam::Text("%a\\_b%".to_string()),
                SqlParam::Int(10),
                SqlParam::Int(20),
            ]
        );
    }

    #[test]
    fn generates_count_without_paging() {
        let owner = Uuid::new_v4();
        let sql = TodoFilter::for_owner(owner)
            .paginate(Pagination::from_page(2, 2))
            .to_count_sql();
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM \"todos\" WHERE \"owner_id\" = $1");
        assert_eq!(sql.params, vec![SqlParam::Uuid(owner)]);
    }
}
