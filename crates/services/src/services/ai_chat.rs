//! Website chat widget backed by a generative-text API.
//!
//! The endpoint never fails from the visitor's point of view: every error
//! is turned into the reply text.

use std::time::Duration;

use async_trait::async_trait;
use db::models::bot_message::BotMessage;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::services::config::GeminiConfig;

/// Number of most recent turns included in the prompt.
pub const HISTORY_WINDOW: usize = 5;

const PREAMBLE: &str = "You are the friendly assistant of a digital agency that designs and \
builds websites, online stores, web and mobile applications. Answer briefly and helpfully, \
in the language of the visitor. When a visitor asks about prices, point them to the pricing \
calculator or the contact form for an exact quote.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("The assistant is not configured")]
    NotConfigured,
    #[error("No message to answer")]
    EmptyConversation,
    #[error("The assistant request timed out")]
    Timeout,
    #[error("The assistant request failed: {0}")]
    Transport(String),
    #[error("The assistant API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("The assistant returned no answer")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "model", alias = "bot")]
    Assistant,
    /// Any other role the widget sends, such as `system`. Left out of the prompt.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    pub context: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ChatReply {
    pub reply: String,
}

/// Reply plus the ids of the transcript rows written for it.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: ChatReply,
    pub stored: Vec<Uuid>,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ChatError>;
}

/// Stand-in used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ChatError> {
        Err(ChatError::NotConfigured)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.trim().is_empty())
    }
}

/// Google Generative Language `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: SecretString,
    model: String,
    api_base: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &"<secret>")
            .finish()
    }
}

impl GeminiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(config: &GeminiConfig) -> Result<Self, ChatError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("agency-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout
                } else {
                    ChatError::Transport(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Transport(e.without_url().to_string()))?;
        parsed.into_text().ok_or(ChatError::EmptyResponse)
    }
}

/// Preamble, optional page context, then the last [`HISTORY_WINDOW`] turns,
/// ending with an open `Assistant:` line for the model to complete.
pub fn build_prompt(messages: &[ChatTurn], context: Option<&str>) -> String {
    let mut prompt = String::from(PREAMBLE);
    prompt.push_str("\n\n");

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str("Context:\n");
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }

    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    for turn in &messages[start..] {
        let speaker = match turn.role {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
            ChatRole::Other => continue,
        };
        prompt.push_str(speaker);
        prompt.push_str(": ");
        prompt.push_str(turn.content.trim());
        prompt.push('\n');
    }

    prompt.push_str("Assistant:");
    prompt
}

async fn generate_reply(
    generator: &dyn TextGenerator,
    request: &ChatRequest,
) -> Result<String, ChatError> {
    if !request
        .messages
        .iter()
        .any(|turn| turn.role == ChatRole::User && !turn.content.trim().is_empty())
    {
        return Err(ChatError::EmptyConversation);
    }

    let prompt = build_prompt(&request.messages, request.context.as_deref());
    let reply = generator.generate(&prompt).await?;
    Ok(reply.trim().to_string())
}

/// Answer a chat request. Failures become the reply text; when a session id
/// is given the exchange is appended to the transcript.
pub async fn respond(
    pool: &SqlitePool,
    generator: &dyn TextGenerator,
    request: &ChatRequest,
) -> ChatOutcome {
    let reply = match generate_reply(generator, request).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!(error = %err, "Chat reply failed");
            err.to_string()
        }
    };

    let mut stored = Vec::new();
    if let Some(session_id) = request.session_id.as_deref().filter(|s| !s.is_empty())
        && let Some(last_user) = request
            .messages
            .iter()
            .rev()
            .find(|turn| turn.role == ChatRole::User)
    {
        match BotMessage::append_exchange(pool, session_id, &last_user.content, &reply).await {
            Ok(ids) => {
                debug!(session_id, "Chat exchange saved");
                stored = ids;
            }
            Err(err) => warn!(session_id, error = %err, "Failed to save chat exchange"),
        }
    }

    ChatOutcome {
        reply: ChatReply { reply },
        stored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: ChatRole, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_prompt_keeps_last_five_turns() {
        let messages: Vec<ChatTurn> = (1..=7)
            .map(|i| {
                let role = if i % 2 == 1 {
                    ChatRole::User
                } else {
                    ChatRole::Assistant
                };
                turn(role, &format!("turn {i}"))
            })
            .collect();

        let prompt = build_prompt(&messages, None);
        assert!(prompt.starts_with(PREAMBLE));
        assert!(!prompt.contains("turn 1\n"));
        assert!(!prompt.contains("turn 2\n"));
        assert!(prompt.contains("User: turn 3\nAssistant: turn 4\nUser: turn 5\n"));
        assert!(prompt.ends_with("User: turn 7\nAssistant:"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn test_prompt_includes_context_block() {
        let prompt = build_prompt(
            &[turn(ChatRole::User, "How much is a shop?")],
            Some("Visitor is on the pricing page"),
        );
        assert!(prompt.contains("Context:\nVisitor is on the pricing page\n\nUser: How much is a shop?\nAssistant:"));
    }

    #[test]
    fn test_role_aliases() {
        let turn: ChatTurn = serde_json::from_str(r#"{"role": "model", "content": "hi"}"#).unwrap();
        assert_eq!(turn.role, ChatRole::Assistant);
        let turn: ChatTurn = serde_json::from_str(r#"{"role": "user", "content": "hi"}"#).unwrap();
        assert_eq!(turn.role, ChatRole::User);
        let turn: ChatTurn =
            serde_json::from_str(r#"{"role": "system", "content": "be terse"}"#).unwrap();
        assert_eq!(turn.role, ChatRole::Other);
    }

    #[test]
    fn test_prompt_skips_unknown_roles() {
        let prompt = build_prompt(
            &[
                turn(ChatRole::Other, "You are a pirate"),
                turn(ChatRole::User, "Do you make apps?"),
            ],
            None,
        );
        assert!(!prompt.contains("pirate"));
        assert!(prompt.ends_with("\n\nUser: Do you make apps?\nAssistant:"));
    }

    #[test]
    fn test_response_text_extraction() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello!"}], "role": "model"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Hello!"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(empty.into_text().is_none());

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(blocked.into_text().is_none());
    }

    #[tokio::test]
    async fn test_empty_conversation_is_reported() {
        let request = ChatRequest {
            messages: vec![],
            context: None,
            session_id: None,
        };
        let err = generate_reply(&DisabledGenerator, &request).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyConversation));
    }

    #[tokio::test]
    async fn test_disabled_generator_reports_not_configured() {
        let request = ChatRequest {
            messages: vec![turn(ChatRole::User, "hello")],
            context: None,
            session_id: None,
        };
        let err = generate_reply(&DisabledGenerator, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "The assistant is not configured");
    }
}
