use axum::{Json, Router, extract::State, response::Json as ResponseJson, routing::post};
use chrono::Utc;
use serde::Deserialize;
use services::services::admin_token::AdminSession;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct LoginRequest {
    pub token: String,
}

/// POST /api/auth/session - Exchange the admin token for a session JWT
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AdminSession>>, ApiError> {
    let session = state.admin_tokens().login(&payload.token, Utc::now())?;
    tracing::info!(expires_at = %session.expires_at, "Admin session issued");
    Ok(ResponseJson(ApiResponse::success(session)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/session", post(create_session))
}
