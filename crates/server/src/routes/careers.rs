use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::career_application::{
    ApplicationStatus, CareerApplication, CreateCareerApplication, UpdateCareerApplication,
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::load_application_middleware};

const TABLE: &str = "career_applications";

#[derive(Debug, Deserialize, TS)]
pub struct ApplicationQueryParams {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

/// POST /api/careers/apply
pub async fn apply(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateCareerApplication>,
) -> Result<ResponseJson<ApiResponse<CareerApplication>>, ApiError> {
    payload.full_name = payload.full_name.trim().to_string();
    payload.email = payload.email.trim().to_string();
    payload.position = payload.position.trim().to_string();
    if payload.full_name.is_empty() || payload.position.is_empty() {
        return Err(ApiError::BadRequest(
            "full_name and position are required".into(),
        ));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".into()));
    }

    let application = CareerApplication::create(state.pool(), &payload).await?;
    tracing::info!(
        application_id = %application.id,
        position = %application.position,
        "Career application received"
    );
    state.events().inserted(TABLE, application.id);
    Ok(ResponseJson(ApiResponse::success(application)))
}

/// GET /api/admin/careers - Optionally filtered by pipeline stage
pub async fn get_applications(
    State(state): State<AppState>,
    Query(params): Query<ApplicationQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<CareerApplication>>>, ApiError> {
    let applications = CareerApplication::find_all(state.pool(), params.status).await?;
    Ok(ResponseJson(ApiResponse::success(applications)))
}

pub async fn get_application(
    Extension(application): Extension<CareerApplication>,
) -> Result<ResponseJson<ApiResponse<CareerApplication>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(application)))
}

/// PUT /api/admin/careers/{id} - Move through the pipeline or annotate
pub async fn update_application(
    Extension(application): Extension<CareerApplication>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCareerApplication>,
) -> Result<ResponseJson<ApiResponse<CareerApplication>>, ApiError> {
    let updated = CareerApplication::update(state.pool(), application.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_application(
    Extension(application): Extension<CareerApplication>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = CareerApplication::delete(state.pool(), application.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, application.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/careers/apply", post(apply))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let application_router = Router::new()
        .route(
            "/",
            get(get_application)
                .put(update_application)
                .delete(delete_application),
        )
        .layer(from_fn_with_state(
            state.clone(),
            load_application_middleware,
        ));

    let inner = Router::new()
        .route("/", get(get_applications))
        .nest("/{application_id}", application_router);

    Router::new().nest("/careers", inner)
}
