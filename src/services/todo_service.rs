use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::FilterConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{Todo, TodoStats};
use crate::database::store::TodoStore;
use crate::filter::{CompletionFilter, ListParams, TodoFilter};
use crate::services::validation::{self, ValidationErrors};

#[derive(Debug, Error)]
pub enum TodoError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Todo not found")]
    NotFound(Uuid),
    #[error("Not authorized")]
    NotAuthorized(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Todo CRUD, filtering and stats, scoped to the calling user.
///
/// Every method takes the caller's id explicitly; a todo is only visible
/// or mutable through its owner.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    filter_config: FilterConfig,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>, filter_config: FilterConfig) -> Self {
        Self { store, filter_config }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store.health_check().await
    }

    /// Caller's todos matching `filter`/`search`, newest first, paged
    pub async fn list(&self, caller: Uuid, params: &ListParams) -> Result<Vec<Todo>, TodoError> {
        let filter = TodoFilter::from_params(caller, params, &self.filter_config);
        debug!(
            "Listing todos for {} (filter={:?}, search={:?}, limit={:?}, offset={})",
            caller, filter.completion, filter.search, filter.page.limit, filter.page.offset
        );
        Ok(self.store.list(&filter).await?)
    }

    pub async fn get(&self, caller: Uuid, id: Uuid) -> Result<Todo, TodoError> {
        self.load_owned(caller, id).await
    }

    /// Validate `body` and persist a new todo owned by `caller`
    pub async fn create(&self, caller: Uuid, body: &Value) -> Result<Todo, TodoError> {
        let input = validation::validate_create(body)?;
        let now = now();
        let todo = Todo {
            id: Uuid::new_v4(),
            owner_id: caller,
            title: input.title,
            description: input.description,
            is_completed: input.is_completed,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(&todo).await?;
        info!("Created todo {} for {}", created.id, caller);
        Ok(created)
    }

    /// Validate, then check existence, then ownership, then merge
    pub async fn update(&self, caller: Uuid, id: Uuid, body: &Value) -> Result<Todo, TodoError> {
        let patch = validation::validate_update(body)?;
        let mut todo = self.load_owned(caller, id).await?;

        patch.apply(&mut todo, now());
        let updated = self
            .store
            .update(&todo)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        info!("Updated todo {} for {}", id, caller);
        Ok(updated)
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<(), TodoError> {
        self.load_owned(caller, id).await?;

        if !self.store.delete(id).await? {
            return Err(TodoError::NotFound(id));
        }
        info!("Deleted todo {} for {}", id, caller);
        Ok(())
    }

    /// Two independent counts; not a point-in-time snapshot under concurrent writes
    pub async fn stats(&self, caller: Uuid) -> Result<TodoStats, TodoError> {
        let all = TodoFilter::for_owner(caller);
        let done = TodoFilter::for_owner(caller).completion(CompletionFilter::Completed);

        let total = self.store.count(&all).await?;
        let completed = self.store.count(&done).await?;
        let stats = TodoStats::from_counts(total, completed);

        debug!("Stats for {}: {:?}", caller, stats);
        Ok(stats)
    }

    async fn load_owned(&self, caller: Uuid, id: Uuid) -> Result<Todo, TodoError> {
        let todo = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        if !todo.is_owned_by(caller) {
            warn!("User {} attempted to access todo {} owned by {}", caller, id, todo.owner_id);
            return Err(TodoError::NotAuthorized(id));
        }
        Ok(todo)
    }
}

/// Microsecond precision so values round-trip through TIMESTAMPTZ unchanged
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ListParams;
    use crate::testing::TestContext;
    use serde_json::json;

    fn list_params(filter: Option<&str>, search: Option<&str>, page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            filter: filter.map(str::to_string),
            search: search.map(str::to_string),
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_sets_owner_from_caller_not_body() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        let spoofed = Uuid::new_v4();

        let todo = ctx
            .service
            .create(caller, &json!({ "title": "Buy milk", "ownerId": spoofed }))
            .await
            .unwrap();

        assert_eq!(todo.owner_id, caller);
        assert_eq!(todo.description, "");
        assert!(!todo.is_completed);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_bad_titles() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();

        for body in [json!({}), json!({ "title": "" }), json!({ "title": "x".repeat(151) })] {
            let err = ctx.service.create(caller, &body).await.unwrap_err();
            assert!(matches!(err, TodoError::Validation(_)), "{body} gave {err:?}");
        }
        assert!(ctx.service.create(caller, &json!({ "title": "x".repeat(150) })).await.is_ok());
        assert_eq!(ctx.store.len().await, 1);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        let created = ctx
            .service
            .create(caller, &json!({ "title": "Write report", "description": "Q3", "isCompleted": true }))
            .await
            .unwrap();

        let fetched = ctx.service.get(caller, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Write report");
        assert_eq!(fetched.description, "Q3");
        assert!(fetched.is_completed);
    }

    #[tokio::test]
    async fn list_filters_by_completion() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        ctx.seed(caller, &[("a", true), ("b", false), ("c", true)]).await;
        ctx.seed(Uuid::new_v4(), &[("other", true)]).await;

        let completed = ctx.service.list(caller, &list_params(Some("completed"), None, None, None)).await.unwrap();
        assert_eq!(completed.len(), 2);
        assert!(completed.iter().all(|t| t.is_completed));

        let pending = ctx.service.list(caller, &list_params(Some("pending"), None, None, None)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending.iter().all(|t| !t.is_completed));

        let all = ctx.service.list(caller, &ListParams::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|t| t.owner_id == caller));
    }

    #[tokio::test]
    async fn list_search_is_case_insensitive_substring() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        ctx.seed(caller, &[("Buy MILK", false), ("Walk dog", false), ("milkshake", true)]).await;

        let hits = ctx.service.list(caller, &list_params(None, Some("milk"), None, None)).await.unwrap();
        let mut titles: Vec<_> = hits.into_iter().map(|t| t.title).collect();
        titles.sort();
        assert_eq!(titles, ["Buy MILK", "milkshake"]);

        let hits = ctx.service.list(caller, &list_params(None, Some(""), None, None)).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginates() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        ctx.seed(caller, &[("1", false), ("2", false), ("3", false), ("4", false), ("5", false)]).await;

        let all = ctx.service.list(caller, &ListParams::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["5", "4", "3", "2", "1"]);

        let page = ctx.service.list(caller, &list_params(None, None, Some("2"), Some("2"))).await.unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["3", "2"]);
    }

    #[tokio::test]
    async fn update_merges_fields_and_refreshes_timestamp() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        let todo = ctx.service.create(caller, &json!({ "title": "Draft", "description": "notes" })).await.unwrap();

        let updated = ctx
            .service
            .update(caller, todo.id, &json!({ "isCompleted": true, "ownerId": Uuid::new_v4(), "createdAt": "2000-01-01T00:00:00Z" }))
            .await
            .unwrap();

        assert!(updated.is_completed);
        assert_eq!(updated.title, "Draft");
        assert_eq!(updated.description, "notes");
        assert_eq!(updated.owner_id, caller);
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at >= todo.updated_at);
    }

    #[tokio::test]
    async fn update_by_non_owner_is_rejected_and_leaves_record() {
        let ctx = TestContext::new();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let todo = ctx.service.create(owner, &json!({ "title": "Mine" })).await.unwrap();

        let err = ctx.service.update(intruder, todo.id, &json!({ "title": "Yours" })).await.unwrap_err();
        assert!(matches!(err, TodoError::NotAuthorized(id) if id == todo.id));

        let err = ctx.service.delete(intruder, todo.id).await.unwrap_err();
        assert!(matches!(err, TodoError::NotAuthorized(_)));

        let err = ctx.service.get(intruder, todo.id).await.unwrap_err();
        assert!(matches!(err, TodoError::NotAuthorized(_)));

        assert_eq!(ctx.service.get(owner, todo.id).await.unwrap(), todo);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        let ghost = Uuid::new_v4();

        assert!(matches!(
            ctx.service.update(caller, ghost, &json!({ "title": "x" })).await,
            Err(TodoError::NotFound(_))
        ));
        assert!(matches!(ctx.service.delete(caller, ghost).await, Err(TodoError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let ctx = TestContext::new();
        let err = ctx
            .service
            .update(Uuid::new_v4(), Uuid::new_v4(), &json!({ "title": "" }))
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_removes_permanently() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        let todo = ctx.service.create(caller, &json!({ "title": "Temp" })).await.unwrap();

        ctx.service.delete(caller, todo.id).await.unwrap();
        assert!(matches!(ctx.service.get(caller, todo.id).await, Err(TodoError::NotFound(_))));
        assert!(matches!(ctx.service.delete(caller, todo.id).await, Err(TodoError::NotFound(_))));
    }

    #[tokio::test]
    async fn stats_counts_callers_todos() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        ctx.seed(caller, &[("a", true), ("b", true), ("c", false), ("d", false), ("e", false)]).await;
        ctx.seed(Uuid::new_v4(), &[("x", true)]).await;

        let stats = ctx.service.stats(caller).await.unwrap();
        assert_eq!(stats, TodoStats { total: 5, completed: 2, pending: 3 });

        let empty = ctx.service.stats(Uuid::new_v4()).await.unwrap();
        assert_eq!(empty, TodoStats { total: 0, completed: 0, pending: 0 });
    }

    #[tokio::test]
    async fn toggling_completion_moves_between_states() {
        let ctx = TestContext::new();
        let caller = Uuid::new_v4();
        let todo = ctx.service.create(caller, &json!({ "title": "Flip" })).await.unwrap();

        ctx.service.update(caller, todo.id, &json!({ "isCompleted": true })).await.unwrap();
        assert_eq!(ctx.service.stats(caller).await.unwrap().completed, 1);

        ctx.service.update(caller, todo.id, &json!({ "isCompleted": false })).await.unwrap();
        assert_eq!(ctx.service.stats(caller).await.unwrap().pending, 1);
    }
}
