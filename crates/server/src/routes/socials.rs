use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::social_link::{CreateSocialLink, SocialLink, UpdateSocialLink};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::load_social_link_middleware};

const TABLE: &str = "social_links";

/// GET /api/socials and GET /api/admin/socials
pub async fn get_socials(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<SocialLink>>>, ApiError> {
    let links = SocialLink::find_all(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(links)))
}

pub async fn create_social(
    State(state): State<AppState>,
    Json(payload): Json<CreateSocialLink>,
) -> Result<ResponseJson<ApiResponse<SocialLink>>, ApiError> {
    if payload.platform.trim().is_empty() || payload.url.trim().is_empty() {
        return Err(ApiError::BadRequest("platform and url are required".into()));
    }
    let link = SocialLink::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, link.id);
    Ok(ResponseJson(ApiResponse::success(link)))
}

pub async fn get_social(
    Extension(link): Extension<SocialLink>,
) -> Result<ResponseJson<ApiResponse<SocialLink>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(link)))
}

pub async fn update_social(
    Extension(link): Extension<SocialLink>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSocialLink>,
) -> Result<ResponseJson<ApiResponse<SocialLink>>, ApiError> {
    let updated = SocialLink::update(state.pool(), link.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_social(
    Extension(link): Extension<SocialLink>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = SocialLink::delete(state.pool(), link.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, link.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/socials", get(get_socials))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let social_router = Router::new()
        .route(
            "/",
            get(get_social).put(update_social).delete(delete_social),
        )
        .layer(from_fn_with_state(state.clone(), load_social_link_middleware));

    let inner = Router::new()
        .route("/", get(get_socials).post(create_social))
        .nest("/{social_id}", social_router);

    Router::new().nest("/socials", inner)
}
