use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use secrecy::ExposeSecret;
use services::services::admin_token::AdminTokenError;
use subtle::ConstantTimeEq;
use tracing::warn;
use utils::response::ApiResponse;

use crate::AppState;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(token)| token.token().to_owned())
}

/// Guards the admin API: requires a valid, unexpired admin session token.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return unauthorized("Missing bearer token");
    };

    match state.admin_tokens().verify(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(AdminTokenError::TokenExpired) => unauthorized("Session expired"),
        Err(error) => {
            warn!(%error, "rejected admin token");
            unauthorized("Invalid token")
        }
    }
}

/// Returns false when a webhook secret is configured and the request does
/// not present it as a bearer token.
pub fn verify_webhook_secret(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(secret) = &state.config().webhook_secret else {
        return true;
    };
    bearer_token(headers).is_some_and(|presented| {
        bool::from(
            presented
                .as_bytes()
                .ct_eq(secret.expose_secret().as_bytes()),
        )
    })
}
