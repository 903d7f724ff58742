use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use chrono::Utc;
use db::models::whatsapp::{WhatsAppChat, WhatsAppMessage};
use serde::Serialize;
use services::services::whatsapp::{self, IngestOutcome, SendRequest, WebhookPayload, WhatsAppError};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{
    AppState,
    error::ApiError,
    middleware::{load_chat_middleware, verify_webhook_secret},
};

const CHATS: &str = "whatsapp_chats";
const MESSAGES: &str = "whatsapp_messages";

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message_id: String,
}

#[derive(Debug, Serialize, TS)]
pub struct RelayError {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

#[derive(Debug, Serialize, TS)]
pub struct ChatWithMessages {
    pub chat: WhatsAppChat,
    pub messages: Vec<WhatsAppMessage>,
}

fn relay_error(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(RelayError {
            error: error.into(),
        }),
    )
        .into_response()
}

fn relay_failure(err: &WhatsAppError) -> Response {
    if err.is_client_error() {
        tracing::debug!(error = %err, "WhatsApp send rejected");
        return relay_error(StatusCode::BAD_REQUEST, err.to_string());
    }
    tracing::error!(error = %err, "WhatsApp send failed");
    let message = match err {
        WhatsAppError::Database(_) => "Failed to record the sent message".to_string(),
        other => other.to_string(),
    };
    relay_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// POST /api/whatsapp/send - `{chatId, message, clientId}`
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return relay_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match whatsapp::send_and_record(state.pool(), state.gateway(), &payload, Utc::now()).await {
        Ok(outcome) => {
            state.events().updated(CHATS, outcome.chat.id);
            if let Some(message) = &outcome.message {
                state.events().inserted(MESSAGES, message.id);
            }
            Json(SendResponse {
                success: true,
                message_id: outcome.message_id,
            })
            .into_response()
        }
        Err(err) => relay_failure(&err),
    }
}

/// POST /api/whatsapp/webhook - Gateway notifications. Acknowledged with 200
/// whenever the body is valid JSON so the gateway does not redeliver.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !verify_webhook_secret(&state, &headers) {
        tracing::warn!("WhatsApp webhook rejected: bad secret");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error("Invalid webhook secret")),
        )
            .into_response();
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed WhatsApp webhook body");
            return relay_error(StatusCode::BAD_REQUEST, "Malformed JSON body");
        }
    };

    match whatsapp::ingest(state.pool(), &payload, Utc::now()).await {
        Ok(IngestOutcome::Stored { chat, message }) => {
            state.events().updated(CHATS, chat.id);
            state.events().inserted(MESSAGES, message.id);
        }
        Ok(IngestOutcome::Ignored | IngestOutcome::Duplicate) => {}
        Err(err) => tracing::error!(error = %err, "Failed to store WhatsApp notification"),
    }

    Json(WebhookAck { status: "ok" }).into_response()
}

/// GET /api/admin/whatsapp/chats - Most recent activity first
pub async fn get_chats(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<WhatsAppChat>>>, ApiError> {
    let chats = WhatsAppChat::find_all(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(chats)))
}

/// GET /api/admin/whatsapp/chats/{id}/messages - Opening a chat marks it read
pub async fn get_chat_messages(
    Extension(chat): Extension<WhatsAppChat>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ChatWithMessages>>, ApiError> {
    let messages = WhatsAppMessage::find_by_chat(state.pool(), chat.id).await?;

    let mut chat = chat;
    if chat.unread_count > 0 {
        WhatsAppChat::mark_read(state.pool(), chat.id).await?;
        chat.unread_count = 0;
        state.events().updated(CHATS, chat.id);
    }

    Ok(ResponseJson(ApiResponse::success(ChatWithMessages {
        chat,
        messages,
    })))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/whatsapp/webhook", post(receive_webhook))
}

/// Relay endpoint; mounted behind the admin guard.
pub fn send_router() -> Router<AppState> {
    Router::new().route("/whatsapp/send", post(send_message))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let chat_router = Router::new()
        .route("/messages", get(get_chat_messages))
        .layer(from_fn_with_state(state.clone(), load_chat_middleware));

    let inner = Router::new()
        .route("/chats", get(get_chats))
        .nest("/chats/{chat_id}", chat_router);

    Router::new().nest("/whatsapp", inner)
}
