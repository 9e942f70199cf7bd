use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::Todo;
use crate::filter::ListParams;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /todos?filter=all|completed|pending&search=&page=1&limit=10
///
/// The query is read as raw pairs so repeated or unknown keys never reject
/// the request.
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Vec<Todo>> {
    let params = ListParams::from_pairs(pairs);
    let todos = state.todos.list(user.user_id, &params).await?;
    Ok(ApiResponse::success(todos))
}

/// POST /todos - create a todo owned by the caller
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Todo> {
    let Json(body) = payload?;
    let todo = state.todos.create(user.user_id, &body).await?;
    Ok(ApiResponse::created(todo))
}
