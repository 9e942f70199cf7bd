use axum::{extract::State, Extension};

use crate::database::TodoStats;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /todos/stats - `{total, completed, pending}` for the caller
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<TodoStats> {
    let stats = state.todos.stats(user.user_id).await?;
    Ok(ApiResponse::success(stats))
}
