use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    FromRow, PgPool, Postgres,
};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Todo;
use crate::database::store::TodoStore;
use crate::filter::{SqlParam, TodoFilter};

const RETURNING: &str = "RETURNING id, owner_id, title, description, is_completed, created_at, updated_at";

/// PostgreSQL-backed todo store
#[derive(Clone)]
pub struct TodoRepository {
    pool: PgPool,
}

impl TodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for TodoRepository {
    async fn insert(&self, todo: &Todo) -> Result<Todo, DatabaseError> {
        let sql = format!(
            "INSERT INTO todos (id, owner_id, title, description, is_completed, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) {}",
            RETURNING
        );
        let row = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.id)
            .bind(todo.owner_id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.is_completed)
            .bind(todo.created_at)
            .bind(todo.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError> {
        let row = sqlx::query_as::<_, Todo>(
            "SELECT id, owner_id, title, description, is_completed, created_at, updated_at \
             FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, DatabaseError> {
        // id, owner_id and created_at are never written after insert
        let sql = format!(
            "UPDATE todos SET title = $2, description = $3, is_completed = $4, updated_at = $5 \
             WHERE id = $1 {}",
            RETURNING
        );
        let row = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.is_completed)
            .bind(todo.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>, DatabaseError> {
        let sql_result = filter.to_sql();
        let q = bind_params(sqlx::query_as::<_, Todo>(&sql_result.query), &sql_result.params);
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count(&self, filter: &TodoFilter) -> Result<i64, DatabaseError> {
        let sql_result = filter.to_count_sql();
        let q = bind_params(sqlx::query_as::<_, (i64,)>(&sql_result.query), &sql_result.params);
        let (count,) = q.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

fn bind_params<'q, O>(
    mut q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for p in params {
        q = match p {
            SqlParam::Uuid(v) => q.bind(*v),
            SqlParam::Bool(v) => q.bind(*v),
            SqlParam::Text(v) => q.bind(v.clone()),
            SqlParam::Int(v) => q.bind(*v),
        };
    }
    q
}
