use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::client::{Client, CreateClient, UpdateClient};
use services::services::onboarding::{self, OnboardingRequest, OnboardingResult};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::load_client_middleware};

const TABLE: &str = "clients";

pub async fn get_clients(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = Client::find_all(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Client name is required".into()));
    }
    let client = Client::create(state.pool(), &payload).await?;
    state.events().inserted(TABLE, client.id);
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// POST /api/admin/clients/onboard - Client, first project and steps in one transaction
pub async fn onboard_client(
    State(state): State<AppState>,
    Json(payload): Json<OnboardingRequest>,
) -> Result<ResponseJson<ApiResponse<OnboardingResult>>, ApiError> {
    let result = onboarding::onboard(state.pool(), &payload).await?;

    let events = state.events();
    events.inserted(TABLE, result.client.id);
    events.inserted("projects", result.project.id);
    for step in &result.steps {
        events.inserted("steps", step.id);
    }
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub async fn get_client(
    Extension(client): Extension<Client>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub async fn update_client(
    Extension(client): Extension<Client>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateClient>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    if payload.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ApiError::BadRequest("Client name cannot be empty".into()));
    }
    let updated = Client::update(state.pool(), client.id, &payload).await?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

/// DELETE /api/admin/clients/{id} - Projects and their steps go with the client
pub async fn delete_client(
    Extension(client): Extension<Client>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Client::delete(state.pool(), client.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, client.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    let client_router = Router::new()
        .route(
            "/",
            get(get_client).put(update_client).delete(delete_client),
        )
        .layer(from_fn_with_state(state.clone(), load_client_middleware));

    let inner = Router::new()
        .route("/", get(get_clients).post(create_client))
        .route("/onboard", post(onboard_client))
        .nest("/{client_id}", client_router);

    Router::new().nest("/clients", inner)
}
