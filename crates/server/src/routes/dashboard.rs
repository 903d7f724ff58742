use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use chrono::Utc;
use db::models::dashboard::DashboardCounts;
use serde::Serialize;
use services::services::timer;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize, TS)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub counts: DashboardCounts,
    pub tracked_seconds_today: i64,
}

/// GET /api/admin/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<DashboardSummary>>, ApiError> {
    let counts = DashboardCounts::fetch(state.pool()).await?;
    let today = timer::today_summary(state.pool(), state.utc_offset(), Utc::now()).await?;
    Ok(ResponseJson(ApiResponse::success(DashboardSummary {
        counts,
        tracked_seconds_today: today.total_seconds,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}
