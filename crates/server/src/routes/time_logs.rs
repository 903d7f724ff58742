use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use chrono::Utc;
use db::models::time_log::TimeLog;
use serde::Deserialize;
use services::services::timer::{self, TimerStart, TodaySummary};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

const TABLE: &str = "time_logs";
const RECENT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, TS)]
pub struct StartTimer {
    pub task_id: Uuid,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct TimeLogQueryParams {
    #[serde(default)]
    pub task_id: Option<Uuid>,
}

/// GET /api/admin/time-logs - A task's logs, or the most recent ones
pub async fn get_time_logs(
    State(state): State<AppState>,
    Query(params): Query<TimeLogQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<TimeLog>>>, ApiError> {
    let logs = match params.task_id {
        Some(task_id) => TimeLog::find_by_task_id(state.pool(), task_id).await?,
        None => TimeLog::find_recent(state.pool(), RECENT_LIMIT).await?,
    };
    Ok(ResponseJson(ApiResponse::success(logs)))
}

/// POST /api/admin/time-logs/start - Stops whatever is running first
pub async fn start_timer(
    State(state): State<AppState>,
    Json(payload): Json<StartTimer>,
) -> Result<ResponseJson<ApiResponse<TimerStart>>, ApiError> {
    let note = payload.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let result = timer::start(state.pool(), payload.task_id, note, Utc::now()).await?;

    for stopped in &result.stopped {
        state.events().updated(TABLE, stopped.id);
    }
    state.events().inserted(TABLE, result.started.id);
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// POST /api/admin/time-logs/stop
pub async fn stop_timer(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<TimeLog>>>, ApiError> {
    let stopped = timer::stop(state.pool(), Utc::now()).await?;
    for log in &stopped {
        state.events().updated(TABLE, log.id);
    }
    Ok(ResponseJson(ApiResponse::success(stopped)))
}

/// GET /api/admin/time-logs/today
pub async fn get_today(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<TodaySummary>>, ApiError> {
    let summary = timer::today_summary(state.pool(), state.utc_offset(), Utc::now()).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub async fn delete_time_log(
    State(state): State<AppState>,
    Path(log_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = TimeLog::delete(state.pool(), log_id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, log_id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(get_time_logs))
        .route("/start", post(start_timer))
        .route("/stop", post(stop_timer))
        .route("/today", get(get_today))
        .route("/{log_id}", delete(delete_time_log));

    Router::new().nest("/time-logs", inner)
}
