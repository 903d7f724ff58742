//! WhatsApp relay and webhook ingestion.
//!
//! Outbound messages go through a [`MessagingGateway`]; both directions end
//! up as rows in `whatsapp_chats` / `whatsapp_messages`.

pub mod gateway;
pub mod webhook;

use chrono::{DateTime, Utc};
use db::models::{
    client::Client,
    whatsapp::{ChatActivity, MessageDirection, NewWhatsAppMessage, WhatsAppChat, WhatsAppMessage},
};
pub use gateway::{DisabledGateway, HttpGateway, MessagingGateway, SentMessage};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;
pub use webhook::WebhookPayload;

#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Unknown client: {0}")]
    ClientNotFound(Uuid),
    #[error("WhatsApp gateway is not configured")]
    NotConfigured,
    #[error("Request to WhatsApp gateway timed out")]
    Timeout,
    #[error("Request to WhatsApp gateway failed: {0}")]
    Transport(String),
    #[error("WhatsApp gateway returned error: HTTP {status} - {body}")]
    Gateway { status: u16, body: String },
    #[error("Failed to parse gateway response: {0}")]
    Parse(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl WhatsAppError {
    /// Errors caused by the caller rather than the gateway or database.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::ClientNotFound(_))
    }
}

/// Raw relay body. Every field is required; they are optional here so a
/// missing one yields a readable error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub chat_id: Option<String>,
    pub message: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSend {
    pub chat_id: String,
    pub message: String,
    pub client_id: Uuid,
}

impl SendRequest {
    pub fn validate(&self) -> Result<ValidSend, WhatsAppError> {
        fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, WhatsAppError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| WhatsAppError::InvalidRequest(format!("{name} is required")))
        }

        let chat_id = required(&self.chat_id, "chatId")?;
        let message = required(&self.message, "message")?;
        let client_id = required(&self.client_id, "clientId")?;
        let client_id = Uuid::parse_str(client_id)
            .map_err(|_| WhatsAppError::InvalidRequest("clientId must be a UUID".into()))?;

        Ok(ValidSend {
            chat_id: chat_id.to_string(),
            message: message.to_string(),
            client_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub message_id: String,
    pub chat: WhatsAppChat,
    pub message: Option<WhatsAppMessage>,
}

/// Deliver a message through the gateway, then record it against the chat.
pub async fn send_and_record(
    pool: &SqlitePool,
    gateway: &dyn MessagingGateway,
    request: &SendRequest,
    now: DateTime<Utc>,
) -> Result<SendOutcome, WhatsAppError> {
    let send = request.validate()?;
    if Client::find_by_id(pool, send.client_id).await?.is_none() {
        return Err(WhatsAppError::ClientNotFound(send.client_id));
    }

    let sent = gateway.send_text(&send.chat_id, &send.message).await?;

    let mut tx = pool.begin().await?;
    let chat = WhatsAppChat::upsert_activity(
        &mut *tx,
        &ChatActivity {
            chat_id: &send.chat_id,
            client_id: Some(send.client_id),
            contact_name: None,
            last_message: &send.message,
            at: now,
            unread_increment: 0,
        },
    )
    .await?;
    let message = WhatsAppMessage::insert(
        &mut *tx,
        &NewWhatsAppMessage {
            chat_row_id: chat.id,
            external_id: Some(&sent.external_id),
            direction: MessageDirection::Outbound,
            body: &send.message,
            sent_at: now,
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        chat_id = %send.chat_id,
        client_id = %send.client_id,
        message_id = %sent.external_id,
        "WhatsApp message sent"
    );
    Ok(SendOutcome {
        message_id: sent.external_id,
        chat,
        message,
    })
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// Notification type without a chat message.
    Ignored,
    /// `idMessage` was already stored.
    Duplicate,
    Stored {
        chat: WhatsAppChat,
        message: WhatsAppMessage,
    },
}

/// Store a webhook notification. Redelivered messages are dropped without
/// touching the chat's unread counter.
pub async fn ingest(
    pool: &SqlitePool,
    payload: &WebhookPayload,
    received_at: DateTime<Utc>,
) -> Result<IngestOutcome, WhatsAppError> {
    let Some(incoming) = payload.to_message(received_at) else {
        debug!(
            type_webhook = payload.type_webhook.as_deref().unwrap_or("<missing>"),
            "Ignoring WhatsApp notification"
        );
        return Ok(IngestOutcome::Ignored);
    };

    let clients = Client::find_with_phone(pool).await?;
    let client_id = webhook::match_client(&clients, &incoming.chat_id).map(|c| c.id);

    let mut tx = pool.begin().await?;
    if let Some(external_id) = incoming.external_id.as_deref()
        && WhatsAppMessage::external_id_exists(&mut *tx, external_id).await?
    {
        debug!(external_id, "Duplicate WhatsApp notification");
        return Ok(IngestOutcome::Duplicate);
    }

    let unread_increment = match incoming.direction {
        MessageDirection::Inbound => 1,
        MessageDirection::Outbound => 0,
    };
    let contact_name = match incoming.direction {
        MessageDirection::Inbound => incoming.sender_name.as_deref(),
        MessageDirection::Outbound => None,
    };

    let chat = WhatsAppChat::upsert_activity(
        &mut *tx,
        &ChatActivity {
            chat_id: &incoming.chat_id,
            client_id,
            contact_name,
            last_message: &incoming.body,
            at: incoming.sent_at,
            unread_increment,
        },
    )
    .await?;

    let Some(message) = WhatsAppMessage::insert(
        &mut *tx,
        &NewWhatsAppMessage {
            chat_row_id: chat.id,
            external_id: incoming.external_id.as_deref(),
            direction: incoming.direction,
            body: &incoming.body,
            sent_at: incoming.sent_at,
        },
    )
    .await?
    else {
        return Ok(IngestOutcome::Duplicate);
    };
    tx.commit().await?;

    info!(
        chat_id = %incoming.chat_id,
        direction = %incoming.direction,
        matched_client = client_id.is_some(),
        "WhatsApp message stored"
    );
    Ok(IngestOutcome::Stored { chat, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(chat_id: Option<&str>, message: Option<&str>, client_id: Option<&str>) -> SendRequest {
        SendRequest {
            chat_id: chat_id.map(str::to_string),
            message: message.map(str::to_string),
            client_id: client_id.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_requires_every_field() {
        let id = Uuid::new_v4().to_string();
        let cases = [
            request(None, Some("hi"), Some(&id)),
            request(Some("1@c.us"), Some("  "), Some(&id)),
            request(Some("1@c.us"), Some("hi"), None),
        ];
        for case in cases {
            let err = case.validate().unwrap_err();
            assert!(matches!(err, WhatsAppError::InvalidRequest(_)));
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn test_validate_parses_client_id() {
        let id = Uuid::new_v4();
        let valid = request(Some("1@c.us"), Some("hi"), Some(&id.to_string()))
            .validate()
            .unwrap();
        assert_eq!(valid.client_id, id);

        let err = request(Some("1@c.us"), Some("hi"), Some("42"))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "clientId must be a UUID");
    }
}
