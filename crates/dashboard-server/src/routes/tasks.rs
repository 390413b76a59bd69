//! `/api/tasks`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use dashboard_core::{ApiSuccess, DeletedId, Task, TaskDraft, TaskPatch, TaskStatus};
use serde::Deserialize;

use super::{created, ok, parse_id, Created};
use crate::error::ApiResult;
use crate::AppState;

const KIND: &str = "Task";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list).post(create))
        .route("/tasks/{id}", get(show).put(update).delete(remove))
        .route("/tasks/{id}/toggle", patch(toggle))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<ApiSuccess<Vec<Task>>>> {
    let Query(query) = query?;
    // Unrecognised filters list everything.
    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<TaskStatus>().ok());
    Ok(ok(state.db()?.list_tasks(status)?))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<Task>>> {
    let id = parse_id(&id, KIND)?;
    Ok(ok(state.db()?.get_task(id)?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> ApiResult<Created<Task>> {
    let Json(draft) = payload?;
    Ok(created(state.db()?.create_task(draft)?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<ApiSuccess<Task>>> {
    let id = parse_id(&id, KIND)?;
    let Json(patch) = payload?;
    Ok(ok(state.db()?.update_task(id, patch)?))
}

async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<Task>>> {
    let id = parse_id(&id, KIND)?;
    Ok(ok(state.db()?.toggle_task(id)?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<DeletedId>>> {
    let id = parse_id(&id, KIND)?;
    state.db()?.delete_task(id)?;
    Ok(ok(DeletedId { id }))
}
