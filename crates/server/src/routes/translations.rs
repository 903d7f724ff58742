use std::collections::BTreeMap;

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::translation::{CreateTranslation, Translation, UpdateTranslation};
use serde::Deserialize;
use services::services::language::{lang_or_default, normalize_lang};
use ts_rs::TS;
use utils::response::ApiResponse;

use super::LangQuery;
use crate::{AppState, error::ApiError, middleware::load_translation_middleware};

const TABLE: &str = "translations";

#[derive(Debug, Deserialize, TS)]
pub struct BulkTranslations {
    pub translations: Vec<CreateTranslation>,
}

fn validate(mut item: CreateTranslation) -> Result<CreateTranslation, ApiError> {
    item.lang = normalize_lang(&item.lang)?;
    item.key = item.key.trim().to_string();
    if item.key.is_empty() {
        return Err(ApiError::BadRequest("translation key is required".into()));
    }
    Ok(item)
}

/// GET /api/translations - `{key: value}` dictionary for one language
pub async fn get_dictionary(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<BTreeMap<String, String>>>, ApiError> {
    let lang = lang_or_default(query.lang.as_deref())?;
    let dictionary = Translation::dictionary(state.pool(), &lang).await?;
    Ok(ResponseJson(ApiResponse::success(dictionary)))
}

/// GET /api/admin/translations
pub async fn get_translations(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Translation>>>, ApiError> {
    let lang = query.lang.as_deref().map(normalize_lang).transpose()?;
    let translations = Translation::find_all(state.pool(), lang.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(translations)))
}

pub async fn create_translation(
    State(state): State<AppState>,
    Json(payload): Json<CreateTranslation>,
) -> Result<ResponseJson<ApiResponse<Translation>>, ApiError> {
    let payload = validate(payload)?;
    let translation = Translation::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, translation.id);
    Ok(ResponseJson(ApiResponse::success(translation)))
}

/// PUT /api/admin/translations/bulk - Insert or overwrite many `(lang, key)` rows at once
pub async fn bulk_upsert_translations(
    State(state): State<AppState>,
    Json(payload): Json<BulkTranslations>,
) -> Result<ResponseJson<ApiResponse<Vec<Translation>>>, ApiError> {
    let items = payload
        .translations
        .into_iter()
        .map(validate)
        .collect::<Result<Vec<_>, _>>()?;

    let saved = Translation::upsert_many(state.pool(), &items).await?;
    for translation in &saved {
        state.events().updated(TABLE, translation.id);
    }
    tracing::info!(count = saved.len(), "Translations upserted");
    Ok(ResponseJson(ApiResponse::success(saved)))
}

pub async fn get_translation(
    Extension(translation): Extension<Translation>,
) -> Result<ResponseJson<ApiResponse<Translation>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(translation)))
}

pub async fn update_translation(
    Extension(translation): Extension<Translation>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTranslation>,
) -> Result<ResponseJson<ApiResponse<Translation>>, ApiError> {
    let updated = Translation::update(state.pool(), translation.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_translation(
    Extension(translation): Extension<Translation>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Translation::delete(state.pool(), translation.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, translation.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/translations", get(get_dictionary))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let translation_router = Router::new()
        .route(
            "/",
            get(get_translation)
                .put(update_translation)
                .delete(delete_translation),
        )
        .layer(from_fn_with_state(
            state.clone(),
            load_translation_middleware,
        ));

    let inner = Router::new()
        .route("/", get(get_translations).post(create_translation))
        .route("/bulk", put(bulk_upsert_translations))
        .nest("/{translation_id}", translation_router);

    Router::new().nest("/translations", inner)
}
