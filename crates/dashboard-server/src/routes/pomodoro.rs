//! `/api/pomodoro`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use dashboard_core::{ApiSuccess, PomodoroSession, PomodoroStats};
use serde::Deserialize;

use super::{created, ok, Created};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pomodoro/session", post(log_session))
        .route("/pomodoro/stats", get(stats))
}

#[derive(Debug, Deserialize)]
struct SessionRequest {
    duration: Option<f64>,
}

async fn log_session(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<Created<PomodoroSession>> {
    let Json(request) = payload?;
    let duration = request
        .duration
        .ok_or_else(|| ApiError::Validation("duration is required".into()))?;
    // i64::MAX rounds up to 2^63 as f64, which no longer fits a session row.
    if !duration.is_finite()
        || duration <= 0.0
        || duration.fract() != 0.0
        || duration >= i64::MAX as f64
    {
        return Err(ApiError::Validation(
            "duration must be a positive whole number of minutes".into(),
        ));
    }
    Ok(created(state.db()?.record_pomodoro_session(duration as u64)?))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<ApiSuccess<PomodoroStats>>> {
    Ok(ok(state.db()?.pomodoro_stats()?))
}
