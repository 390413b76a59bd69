//! `/api/notes`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use dashboard_core::{ApiSuccess, DeletedId, Note, NoteDraft, NotePatch};

use super::{created, ok, parse_id, Created};
use crate::error::ApiResult;
use crate::AppState;

const KIND: &str = "Note";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list).post(create))
        .route("/notes/{id}", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiSuccess<Vec<Note>>>> {
    Ok(ok(state.db()?.list_notes()?))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<Note>>> {
    let id = parse_id(&id, KIND)?;
    Ok(ok(state.db()?.get_note(id)?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NoteDraft>, JsonRejection>,
) -> ApiResult<Created<Note>> {
    let Json(draft) = payload?;
    Ok(created(state.db()?.create_note(draft)?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NotePatch>, JsonRejection>,
) -> ApiResult<Json<ApiSuccess<Note>>> {
    let id = parse_id(&id, KIND)?;
    let Json(patch) = payload?;
    Ok(ok(state.db()?.update_note(id, patch)?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<DeletedId>>> {
    let id = parse_id(&id, KIND)?;
    state.db()?.delete_note(id)?;
    Ok(ok(DeletedId { id }))
}
