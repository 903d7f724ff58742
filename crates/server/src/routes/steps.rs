use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::step::{CreateStep, Step, UpdateStep};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_step_middleware};

const TABLE: &str = "steps";

#[derive(Debug, Deserialize, TS)]
pub struct StepQueryParams {
    pub project_id: Uuid,
}

/// GET /api/admin/steps?project_id= - A project's steps in position order
pub async fn get_steps(
    State(state): State<AppState>,
    Query(params): Query<StepQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Step>>>, ApiError> {
    let steps = Step::find_by_project_id(state.pool(), params.project_id).await?;
    Ok(ResponseJson(ApiResponse::success(steps)))
}

/// POST /api/admin/steps - Appended at the end unless a position is given
pub async fn create_step(
    State(state): State<AppState>,
    Json(payload): Json<CreateStep>,
) -> Result<ResponseJson<ApiResponse<Step>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Step title is required".into()));
    }
    let step = Step::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, step.id);
    Ok(ResponseJson(ApiResponse::success(step)))
}

pub async fn get_step(
    Extension(step): Extension<Step>,
) -> Result<ResponseJson<ApiResponse<Step>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(step)))
}

pub async fn update_step(
    Extension(step): Extension<Step>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateStep>,
) -> Result<ResponseJson<ApiResponse<Step>>, ApiError> {
    let updated = Step::update(state.pool(), step.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

/// POST /api/admin/steps/{id}/toggle - Flip completion
pub async fn toggle_step(
    Extension(step): Extension<Step>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Step>>, ApiError> {
    let toggled = Step::toggle(state.pool(), step.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    state.events().updated(TABLE, toggled.id);
    Ok(ResponseJson(ApiResponse::success(toggled)))
}

pub async fn delete_step(
    Extension(step): Extension<Step>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Step::delete(state.pool(), step.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, step.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    let step_router = Router::new()
        .route("/", get(get_step).put(update_step).delete(delete_step))
        .route("/toggle", post(toggle_step))
        .layer(from_fn_with_state(state.clone(), load_step_middleware));

    let inner = Router::new()
        .route("/", get(get_steps).post(create_step))
        .nest("/{step_id}", step_router);

    Router::new().nest("/steps", inner)
}
