use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::bot_message::BotMessage;
use serde::Deserialize;
use services::services::ai_chat::{self, ChatReply, ChatRequest};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

const TABLE: &str = "bot_messages";

#[derive(Debug, Deserialize, TS)]
pub struct BotMessageQueryParams {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// POST /api/chat - Always 200; failures come back as the reply text
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatReply> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Chat request rejected");
            return Json(ChatReply {
                reply: rejection.body_text(),
            });
        }
    };

    let outcome = ai_chat::respond(state.pool(), state.generator(), &payload).await;
    for id in outcome.stored {
        state.events().inserted(TABLE, id);
    }
    Json(outcome.reply)
}

/// GET /api/admin/bot-messages - One session's transcript, or the latest
/// message of every session when no `session_id` is given
pub async fn get_bot_messages(
    State(state): State<AppState>,
    Query(params): Query<BotMessageQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<BotMessage>>>, ApiError> {
    let messages = match params.session_id.as_deref().filter(|s| !s.is_empty()) {
        Some(session_id) => BotMessage::find_by_session(state.pool(), session_id).await?,
        None => BotMessage::find_latest_per_session(state.pool()).await?,
    };
    Ok(ResponseJson(ApiResponse::success(messages)))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/bot-messages", get(get_bot_messages))
}
