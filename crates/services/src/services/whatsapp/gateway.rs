//! Outbound messaging gateway.
//!
//! The relay talks to the gateway through [`MessagingGateway`] so the HTTP
//! implementation can be swapped for a fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::WhatsAppError;
use crate::services::config::WhatsAppConfig;

/// Gateway acknowledgement of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub external_id: String,
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<SentMessage, WhatsAppError>;
}

/// Stand-in used when no gateway URL is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGateway;

#[async_trait]
impl MessagingGateway for DisabledGateway {
    async fn send_text(&self, _chat_id: &str, _text: &str) -> Result<SentMessage, WhatsAppError> {
        Err(WhatsAppError::NotConfigured)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageResponse {
    id_message: Option<String>,
}

/// REST gateway: `POST {api_url}` with `{chatId, message}` and an optional
/// bearer token, answering `{idMessage}`.
#[derive(Clone)]
pub struct HttpGateway {
    http: Client,
    api_url: String,
    api_token: Option<SecretString>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("http", &"<reqwest::Client>")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<secret>"))
            .finish()
    }
}

impl HttpGateway {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(config: &WhatsAppConfig) -> Result<Self, WhatsAppError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("agency-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WhatsAppError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl MessagingGateway for HttpGateway {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<SentMessage, WhatsAppError> {
        let mut request = self.http.post(&self.api_url).json(&SendMessageBody {
            chat_id,
            message: text,
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), chat_id, "WhatsApp gateway rejected message");
            return Err(WhatsAppError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| WhatsAppError::Parse(e.to_string()))?;
        let external_id = parsed
            .id_message
            .filter(|id| !id.is_empty())
            .ok_or_else(|| WhatsAppError::Parse("response is missing idMessage".into()))?;

        debug!(chat_id, external_id = %external_id, "WhatsApp message accepted");
        Ok(SentMessage { external_id })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> WhatsAppError {
    if err.is_timeout() {
        WhatsAppError::Timeout
    } else {
        WhatsAppError::Transport(err.to_string())
    }
}
