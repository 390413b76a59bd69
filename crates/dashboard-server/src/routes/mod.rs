pub mod links;
pub mod notes;
pub mod pomodoro;
pub mod tasks;

use axum::http::StatusCode;
use axum::Json;
use dashboard_core::ApiSuccess;

use crate::error::ApiError;

pub(crate) type Created<T> = (StatusCode, Json<ApiSuccess<T>>);

pub(crate) fn ok<T>(data: T) -> Json<ApiSuccess<T>> {
    Json(ApiSuccess::new(data))
}

pub(crate) fn created<T>(data: T) -> Created<T> {
    (StatusCode::CREATED, ok(data))
}

/// Path ids are SQLite rowids; anything else cannot name a record.
pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(kind))
}
