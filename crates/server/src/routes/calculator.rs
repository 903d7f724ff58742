use axum::{
    Json, Router,
    response::Json as ResponseJson,
    routing::{get, post},
};
use services::services::pricing::{self, PricingOptions, Quote, QuoteRequest};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/calculator/options - Tables behind the pricing calculator
pub async fn get_options() -> ResponseJson<ApiResponse<PricingOptions>> {
    ResponseJson(ApiResponse::success(pricing::options()))
}

/// POST /api/calculator/quote - Price a service/scale/feature selection
pub async fn create_quote(
    Json(payload): Json<QuoteRequest>,
) -> Result<ResponseJson<ApiResponse<Quote>>, ApiError> {
    let quote = pricing::quote(&payload)?;
    tracing::debug!(
        service = %quote.service,
        scale = %quote.scale,
        total_cents = quote.total_cents,
        "Quote calculated"
    );
    Ok(ResponseJson(ApiResponse::success(quote)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/options", get(get_options))
        .route("/quote", post(create_quote));

    Router::new().nest("/calculator", inner)
}
