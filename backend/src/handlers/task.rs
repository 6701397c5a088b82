//! Dashboard task handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{CreateTaskInput, Task};
use crate::services::TaskService;
use crate::AppState;

pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Task>>> {
    let service = TaskService::new(state.db.clone());
    Ok(Json(service.list_tasks(&user.user_id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateTaskInput>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let service = TaskService::new(state.db.clone());
    let task = service.create_task(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}
