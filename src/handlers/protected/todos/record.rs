use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::database::Todo;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, MessageResponse};
use crate::services::{validate_update, TodoError};
use crate::state::AppState;

/// Ids that are not UUIDs cannot name an existing todo
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Todo not found"))
}

/// GET /todos/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Todo> {
    let id = parse_id(&id)?;
    let todo = state.todos.get(user.user_id, id).await?;
    Ok(ApiResponse::success(todo))
}

/// PUT /todos/:id - partial update of title, description and isCompleted
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Todo> {
    let Json(body) = payload?;
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(not_found) => {
            // A bad body is reported ahead of a missing record
            validate_update(&body).map_err(TodoError::Validation)?;
            return Err(not_found);
        }
    };
    let todo = state.todos.update(user.user_id, id, &body).await?;
    Ok(ApiResponse::success(todo))
}

/// DELETE /todos/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = parse_id(&id)?;
    state.todos.delete(user.user_id, id).await?;
    Ok(ApiResponse::success(MessageResponse::new("Todo removed")))
}
