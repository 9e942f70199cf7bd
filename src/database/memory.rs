use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Todo;
use crate::database::store::TodoStore;
use crate::filter::TodoFilter;

/// In-process todo store for tests and local runs without PostgreSQL.
///
/// Records created within the same clock tick keep insertion order, so
/// "newest first" stays deterministic.
#[derive(Default)]
pub struct MemoryTodoStore {
    records: RwLock<HashMap<Uuid, (u64, Todo)>>,
    sequence: AtomicU64,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn insert(&self, todo: &Todo) -> Result<Todo, DatabaseError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write().await;
        records.insert(todo.id, (seq, todo.clone()));
        Ok(todo.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records.get(&id).map(|(_, t)| t.clone()))
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, DatabaseError> {
        let mut records = self.records.write().await;
        let Some((_, stored)) = records.get_mut(&todo.id) else {
            return Ok(None);
        };
        stored.title = todo.title.clone();
        stored.description = todo.description.clone();
        stored.is_completed = todo.is_completed;
        stored.updated_at = todo.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut records = self.records.write().await;
        Ok(records.remove(&id).is_some())
    }

    async fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>, DatabaseError> {
        let records = self.records.read().await;
        let mut matching: Vec<&(u64, Todo)> = records.values().filter(|(_, t)| filter.matches(t)).collect();
        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });

        let offset = usize::try_from(filter.page.offset).unwrap_or(0);
        let limit = filter
            .page
            .limit
            .map(|l| usize::try_from(l).unwrap_or(0))
            .unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn count(&self, filter: &TodoFilter) -> Result<i64, DatabaseError> {
        let records = self.records.read().await;
        let n = records.values().filter(|(_, t)| filter.matches(t)).count();
        Ok(n as i64)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
