use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::{MemoryTodoStore, Todo};
use crate::services::TodoService;

/// Service wired to a fresh in-memory store
pub struct TestContext {
    pub store: Arc<MemoryTodoStore>,
    pub service: TodoService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryTodoStore::new());
        let service = TodoService::new(store.clone(), AppConfig::development().filter);
        Self { store, service }
    }

    /// Create todos for `owner` in order, oldest first
    pub async fn seed(&self, owner: Uuid, items: &[(&str, bool)]) -> Vec<Todo> {
        let mut created = Vec::with_capacity(items.len());
        for (title, done) in items {
            let todo = self
                .service
                .create(owner, &json!({ "title": title, "isCompleted": done }))
                .await
                .expect("seed todo");
            created.push(todo);
        }
        created
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
