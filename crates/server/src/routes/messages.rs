use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::message::{CreateMessage, Message};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::load_message_middleware};

const TABLE: &str = "messages";

#[derive(Debug, Deserialize, TS)]
pub struct MessageQueryParams {
    #[serde(default)]
    pub unread: bool,
}

/// Body of the public contact form.
#[derive(Debug, Deserialize, TS)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(alias = "message")]
    pub body: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ContactForm {
    fn into_message(self) -> Result<CreateMessage, ApiError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let body = self.body.trim().to_string();
        if name.is_empty() || body.is_empty() {
            return Err(ApiError::BadRequest("name and message are required".into()));
        }
        if !email.contains('@') {
            return Err(ApiError::BadRequest("a valid email is required".into()));
        }
        Ok(CreateMessage {
            client_id: None,
            name,
            email,
            phone: non_blank(self.phone),
            subject: non_blank(self.subject),
            body,
        })
    }
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactForm>,
) -> Result<ResponseJson<ApiResponse<Message>>, ApiError> {
    let message = Message::create(state.pool(), &payload.into_message()?).await?;
    tracing::info!(message_id = %message.id, "Contact message received");
    state.events().inserted(TABLE, message.id);
    Ok(ResponseJson(ApiResponse::success(message)))
}

/// GET /api/admin/messages - Newest first; `?unread=true` hides read ones
pub async fn get_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Message>>>, ApiError> {
    let messages = Message::find_all(state.pool(), params.unread).await?;
    Ok(ResponseJson(ApiResponse::success(messages)))
}

pub async fn get_message(
    Extension(message): Extension<Message>,
) -> Result<ResponseJson<ApiResponse<Message>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(message)))
}

/// POST /api/admin/messages/{id}/read
pub async fn mark_message_read(
    Extension(message): Extension<Message>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Message>>, ApiError> {
    let updated = Message::set_read(state.pool(), message.id, true)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    state.events().updated(TABLE, updated.id);
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub async fn delete_message(
    Extension(message): Extension<Message>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Message::delete(state.pool(), message.id).await?;
    if rows_affected == 0 {
        Err(ApiError::Database(sqlx::Error::RowNotFound))
    } else {
        state.events().deleted(TABLE, message.id);
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let message_router = Router::new()
        .route("/", get(get_message).delete(delete_message))
        .route("/read", post(mark_message_read))
        .layer(from_fn_with_state(state.clone(), load_message_middleware));

    let inner = Router::new()
        .route("/", get(get_messages))
        .nest("/{message_id}", message_router);

    Router::new().nest("/messages", inner)
}
