use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::technology::{CreateTechnology, Technology, UpdateTechnology};
use services::services::language::{lang_or_default, normalize_lang};
use utils::response::ApiResponse;

use super::LangQuery;
use crate::{AppState, error::ApiError, middleware::load_technology_middleware};

const TABLE: &str = "technologies";

/// GET /api/technologies
pub async fn get_public_technologies(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Technology>>>, ApiError> {
    let lang = lang_or_default(query.lang.as_deref())?;
    let technologies = Technology::find_all(state.pool(), Some(&lang)).await?;
    Ok(ResponseJson(ApiResponse::success(technologies)))
}

/// GET /api/admin/technologies
pub async fn get_technologies(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Technology>>>, ApiError> {
    let lang = query.lang.as_deref().map(normalize_lang).transpose()?;
    let technologies = Technology::find_all(state.pool(), lang.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(technologies)))
}

pub async fn create_technology(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateTechnology>,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    payload.lang = normalize_lang(&payload.lang)?;
    if payload.name.trim().is_empty() || payload.category.trim().is_empty() {
        return Err(ApiError::BadRequest("name and category are required".into()));
    }
    let technology = Technology::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, technology.id);
    Ok(ResponseJson(ApiResponse::success(technology)))
}

pub async fn get_technology(
    Extension(technology): Extension<Technology>,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(technology)))
}

pub async fn update_technology(
    Extension(technology): Extension<Technology>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTechnology>,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    let updated = Technology::update(state.pool(), technology.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_technology(
    Extension(technology): Extension<Technology>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Technology::delete(state.pool(), technology.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, technology.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/technologies", get(get_public_technologies))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let technology_router = Router::new()
        .route(
            "/",
            get(get_technology)
                .put(update_technology)
                .delete(delete_technology),
        )
        .layer(from_fn_with_state(state.clone(), load_technology_middleware));

    let inner = Router::new()
        .route("/", get(get_technologies).post(create_technology))
        .nest("/{technology_id}", technology_router);

    Router::new().nest("/technologies", inner)
}
