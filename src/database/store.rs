use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::Todo;
use crate::filter::TodoFilter;

/// Persistence seam for todos.
///
/// Single-record writes are atomic; nothing spans multiple records, so
/// implementations need no transactions.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist a fully-formed new record and return it as stored
    async fn insert(&self, todo: &Todo) -> Result<Todo, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError>;

    /// Overwrite the mutable fields of an existing record.
    /// Returns `None` if the record vanished in the meantime.
    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, DatabaseError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Matching records, newest `created_at` first, paged per the filter
    async fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>, DatabaseError>;

    /// Number of matching records, ignoring paging
    async fn count(&self, filter: &TodoFilter) -> Result<i64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
