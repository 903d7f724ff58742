use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::service_offering::{
    CreateServiceOffering, ServiceOffering, UpdateServiceOffering,
};
use services::services::language::{lang_or_default, normalize_lang};
use utils::response::ApiResponse;

use super::LangQuery;
use crate::{AppState, error::ApiError, middleware::load_service_middleware};

const TABLE: &str = "services";

/// GET /api/services - Published services for one language
pub async fn get_published_services(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ServiceOffering>>>, ApiError> {
    let lang = lang_or_default(query.lang.as_deref())?;
    let services = ServiceOffering::find_published(state.pool(), &lang).await?;
    Ok(ResponseJson(ApiResponse::success(services)))
}

/// GET /api/admin/services - Every service, optionally filtered by language
pub async fn get_services(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ServiceOffering>>>, ApiError> {
    let lang = query.lang.as_deref().map(normalize_lang).transpose()?;
    let services = ServiceOffering::find_all(state.pool(), lang.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(services)))
}

/// POST /api/admin/services
pub async fn create_service(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateServiceOffering>,
) -> Result<ResponseJson<ApiResponse<ServiceOffering>>, ApiError> {
    payload.lang = normalize_lang(&payload.lang)?;
    if payload.slug.trim().is_empty() || payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("slug and title are required".into()));
    }
    let service = ServiceOffering::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, service.id);
    Ok(ResponseJson(ApiResponse::success(service)))
}

/// GET /api/admin/services/{id}
pub async fn get_service(
    Extension(service): Extension<ServiceOffering>,
) -> Result<ResponseJson<ApiResponse<ServiceOffering>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(service)))
}

/// PUT /api/admin/services/{id} - Partial update
pub async fn update_service(
    Extension(service): Extension<ServiceOffering>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateServiceOffering>,
) -> Result<ResponseJson<ApiResponse<ServiceOffering>>, ApiError> {
    let updated = ServiceOffering::update(state.pool(), service.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

/// DELETE /api/admin/services/{id}
pub async fn delete_service(
    Extension(service): Extension<ServiceOffering>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = ServiceOffering::delete(state.pool(), service.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, service.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/services", get(get_published_services))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let service_router = Router::new()
        .route(
            "/",
            get(get_service).put(update_service).delete(delete_service),
        )
        .layer(from_fn_with_state(state.clone(), load_service_middleware));

    let inner = Router::new()
        .route("/", get(get_services).post(create_service))
        .nest("/{service_id}", service_router);

    Router::new().nest("/services", inner)
}
