//! `/api/links`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use dashboard_core::{ApiSuccess, DeletedId, LinkDraft, LinkPatch, LinkPosition, QuickLink};
use serde::Deserialize;

use super::{created, ok, parse_id, Created};
use crate::error::ApiResult;
use crate::AppState;

const KIND: &str = "Link";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list).post(create))
        .route("/links/reorder", put(reorder))
        .route("/links/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    links: Vec<LinkPosition>,
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiSuccess<Vec<QuickLink>>>> {
    Ok(ok(state.db()?.list_links()?))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<QuickLink>>> {
    let id = parse_id(&id, KIND)?;
    Ok(ok(state.db()?.get_link(id)?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<LinkDraft>, JsonRejection>,
) -> ApiResult<Created<QuickLink>> {
    let Json(draft) = payload?;
    Ok(created(state.db()?.create_link(draft)?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LinkPatch>, JsonRejection>,
) -> ApiResult<Json<ApiSuccess<QuickLink>>> {
    let id = parse_id(&id, KIND)?;
    let Json(patch) = payload?;
    Ok(ok(state.db()?.update_link(id, patch)?))
}

async fn reorder(
    State(state): State<AppState>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<ApiSuccess<Vec<QuickLink>>>> {
    let Json(request) = payload?;
    Ok(ok(state.db()?.reorder_links(&request.links)?))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<DeletedId>>> {
    let id = parse_id(&id, KIND)?;
    state.db()?.delete_link(id)?;
    Ok(ok(DeletedId { id }))
}
