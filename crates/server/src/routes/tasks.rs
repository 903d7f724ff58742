use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use db::models::task::{CreateTask, Task, UpdateTask};
use serde::Deserialize;
use services::services::{
    schedule::{self, DailySchedule, WeeklySchedule},
    timer::local_today,
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_task_middleware};

const TABLE: &str = "tasks";

#[derive(Debug, Deserialize, TS)]
pub struct TaskQueryParams {
    #[serde(default)]
    pub project_id: Option<Uuid>,
    /// Only tasks due on this day.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, TS)]
pub struct DailyScheduleQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

pub async fn get_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let pool = state.pool();
    let tasks = match (params.project_id, params.date) {
        (Some(project_id), date) => {
            let mut tasks = Task::find_by_project_id(pool, project_id).await?;
            if let Some(date) = date {
                tasks.retain(|task| task.due_date == Some(date));
            }
            tasks
        }
        (None, Some(date)) => Task::find_by_due_date(pool, date).await?,
        (None, None) => Task::find_all(pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Task title is required".into()));
    }
    let task = Task::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, task.id);
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// GET /api/admin/tasks/schedule/daily?date= - Morning/afternoon/evening planner
pub async fn get_daily_schedule(
    State(state): State<AppState>,
    Query(query): Query<DailyScheduleQuery>,
) -> Result<ResponseJson<ApiResponse<DailySchedule>>, ApiError> {
    let day = query
        .date
        .unwrap_or_else(|| local_today(Utc::now(), state.utc_offset()));
    let tasks = Task::find_by_due_date(state.pool(), day).await?;
    Ok(ResponseJson(ApiResponse::success(schedule::bucket_daily(
        tasks, day,
    ))))
}

/// GET /api/admin/tasks/schedule/weekly - Overdue/today/tomorrow/this week/later
pub async fn get_weekly_schedule(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<WeeklySchedule>>, ApiError> {
    let today = local_today(Utc::now(), state.utc_offset());
    let tasks = Task::find_for_week(state.pool(), today).await?;
    Ok(ResponseJson(ApiResponse::success(schedule::bucket_weekly(
        tasks, today,
    ))))
}

pub async fn get_task(
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    Extension(task): Extension<Task>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    if payload.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Task title cannot be empty".into()));
    }
    let updated = Task::update(state.pool(), task.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_task(
    Extension(task): Extension<Task>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Task::delete(state.pool(), task.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, task.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    let task_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .layer(from_fn_with_state(state.clone(), load_task_middleware));

    let inner = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .route("/schedule/daily", get(get_daily_schedule))
        .route("/schedule/weekly", get(get_weekly_schedule))
        .nest("/{task_id}", task_router);

    Router::new().nest("/tasks", inner)
}
