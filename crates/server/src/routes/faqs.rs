use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::faq::{CreateFaq, Faq, UpdateFaq};
use services::services::language::{lang_or_default, normalize_lang};
use utils::response::ApiResponse;

use super::LangQuery;
use crate::{AppState, error::ApiError, middleware::load_faq_middleware};

const TABLE: &str = "faqs";

/// GET /api/faqs
pub async fn get_public_faqs(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Faq>>>, ApiError> {
    let lang = lang_or_default(query.lang.as_deref())?;
    let faqs = Faq::find_all(state.pool(), Some(&lang)).await?;
    Ok(ResponseJson(ApiResponse::success(faqs)))
}

/// GET /api/admin/faqs
pub async fn get_faqs(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Faq>>>, ApiError> {
    let lang = query.lang.as_deref().map(normalize_lang).transpose()?;
    let faqs = Faq::find_all(state.pool(), lang.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(faqs)))
}

pub async fn create_faq(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateFaq>,
) -> Result<ResponseJson<ApiResponse<Faq>>, ApiError> {
    payload.lang = normalize_lang(&payload.lang)?;
    if payload.question.trim().is_empty() || payload.answer.trim().is_empty() {
        return Err(ApiError::BadRequest("question and answer are required".into()));
    }
    let faq = Faq::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, faq.id);
    Ok(ResponseJson(ApiResponse::success(faq)))
}

pub async fn get_faq(
    Extension(faq): Extension<Faq>,
) -> Result<ResponseJson<ApiResponse<Faq>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(faq)))
}

pub async fn update_faq(
    Extension(faq): Extension<Faq>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateFaq>,
) -> Result<ResponseJson<ApiResponse<Faq>>, ApiError> {
    let updated = Faq::update(state.pool(), faq.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_faq(
    Extension(faq): Extension<Faq>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Faq::delete(state.pool(), faq.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, faq.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/faqs", get(get_public_faqs))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let faq_router = Router::new()
        .route("/", get(get_faq).put(update_faq).delete(delete_faq))
        .layer(from_fn_with_state(state.clone(), load_faq_middleware));

    let inner = Router::new()
        .route("/", get(get_faqs).post(create_faq))
        .nest("/{faq_id}", faq_router);

    Router::new().nest("/faqs", inner)
}
