use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::project::{CreateProject, Project, UpdateProject};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_project_middleware};

const TABLE: &str = "projects";

#[derive(Debug, Deserialize, TS)]
pub struct ProjectQueryParams {
    #[serde(default)]
    pub client_id: Option<Uuid>,
}

/// GET /api/admin/projects - All projects, or one client's with `?client_id=`
pub async fn get_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = match params.client_id {
        Some(client_id) => Project::find_by_client_id(state.pool(), client_id).await?,
        None => Project::find_all(state.pool()).await?,
    };
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Project name is required".into()));
    }
    let project = Project::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, project.id);
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn get_project(
    Extension(project): Extension<Project>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    Extension(project): Extension<Project>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let updated = Project::update(state.pool(), project.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_project(
    Extension(project): Extension<Project>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Project::delete(state.pool(), project.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, project.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    let project_router = Router::new()
        .route(
            "/",
            get(get_project).put(update_project).delete(delete_project),
        )
        .layer(from_fn_with_state(state.clone(), load_project_middleware));

    let inner = Router::new()
        .route("/", get(get_projects).post(create_project))
        .nest("/{project_id}", project_router);

    Router::new().nest("/projects", inner)
}
