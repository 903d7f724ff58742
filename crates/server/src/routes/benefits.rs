use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::benefit::{Benefit, CreateBenefit, UpdateBenefit};
use services::services::language::{lang_or_default, normalize_lang};
use utils::response::ApiResponse;

use super::LangQuery;
use crate::{AppState, error::ApiError, middleware::load_benefit_middleware};

const TABLE: &str = "benefits";

/// GET /api/benefits
pub async fn get_public_benefits(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Benefit>>>, ApiError> {
    let lang = lang_or_default(query.lang.as_deref())?;
    let benefits = Benefit::find_all(state.pool(), Some(&lang)).await?;
    Ok(ResponseJson(ApiResponse::success(benefits)))
}

/// GET /api/admin/benefits
pub async fn get_benefits(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Benefit>>>, ApiError> {
    let lang = query.lang.as_deref().map(normalize_lang).transpose()?;
    let benefits = Benefit::find_all(state.pool(), lang.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(benefits)))
}

pub async fn create_benefit(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateBenefit>,
) -> Result<ResponseJson<ApiResponse<Benefit>>, ApiError> {
    payload.lang = normalize_lang(&payload.lang)?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }
    let benefit = Benefit::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, benefit.id);
    Ok(ResponseJson(ApiResponse::success(benefit)))
}

pub async fn get_benefit(
    Extension(benefit): Extension<Benefit>,
) -> Result<ResponseJson<ApiResponse<Benefit>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(benefit)))
}

pub async fn update_benefit(
    Extension(benefit): Extension<Benefit>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateBenefit>,
) -> Result<ResponseJson<ApiResponse<Benefit>>, ApiError> {
    let updated = Benefit::update(state.pool(), benefit.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_benefit(
    Extension(benefit): Extension<Benefit>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Benefit::delete(state.pool(), benefit.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, benefit.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/benefits", get(get_public_benefits))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let benefit_router = Router::new()
        .route(
            "/",
            get(get_benefit).put(update_benefit).delete(delete_benefit),
        )
        .layer(from_fn_with_state(state.clone(), load_benefit_middleware));

    let inner = Router::new()
        .route("/", get(get_benefits).post(create_benefit))
        .nest("/{benefit_id}", benefit_router);

    Router::new().nest("/benefits", inner)
}
