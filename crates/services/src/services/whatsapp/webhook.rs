//! Gateway notification payloads and sender matching.

use chrono::{DateTime, Utc};
use db::models::{client::Client, whatsapp::MessageDirection};
use serde::Deserialize;

const MIN_PHONE_DIGITS: usize = 7;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub type_webhook: Option<String>,
    pub id_message: Option<String>,
    pub timestamp: Option<i64>,
    pub sender_data: Option<SenderData>,
    pub message_data: Option<MessageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderData {
    pub chat_id: Option<String>,
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    pub type_message: Option<String>,
    pub text_message_data: Option<TextMessageData>,
    pub extended_text_message_data: Option<ExtendedTextMessageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageData {
    pub text_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendedTextMessageData {
    pub text: Option<String>,
}

/// A notification reduced to what gets stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookMessage {
    pub direction: MessageDirection,
    pub chat_id: String,
    pub sender_name: Option<String>,
    pub external_id: Option<String>,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl WebhookPayload {
    /// `None` for notification types that carry no chat message, or when
    /// the chat id is missing.
    pub fn to_message(&self, received_at: DateTime<Utc>) -> Option<WebhookMessage> {
        let direction = match self.type_webhook.as_deref()? {
            "incomingMessageReceived" => MessageDirection::Inbound,
            "outgoingMessageReceived" | "outgoingAPIMessageReceived" => MessageDirection::Outbound,
            _ => return None,
        };

        let sender = self.sender_data.as_ref()?;
        let chat_id = sender.chat_id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;

        let sent_at = self
            .timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or(received_at);

        Some(WebhookMessage {
            direction,
            chat_id: chat_id.to_string(),
            sender_name: sender
                .sender_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            external_id: self.id_message.clone().filter(|id| !id.is_empty()),
            body: self.body(),
            sent_at,
        })
    }

    /// Text content, or `[typeMessage]` for media and other non-text kinds.
    fn body(&self) -> String {
        let Some(data) = &self.message_data else {
            return "[unknown]".to_string();
        };

        let text = data
            .text_message_data
            .as_ref()
            .and_then(|t| t.text_message.clone())
            .or_else(|| {
                data.extended_text_message_data
                    .as_ref()
                    .and_then(|t| t.text.clone())
            });

        match text {
            Some(text) => text,
            None => format!(
                "[{}]",
                data.type_message.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

pub fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Phone digits of a gateway chat id such as `15550100@c.us`.
pub fn chat_phone_digits(chat_id: &str) -> String {
    digits(chat_id.split('@').next().unwrap_or_default())
}

/// Numbers match when both have enough digits and one contains the other,
/// so `+1 (555) 010-0123` matches `15550100123@c.us` and `5550100123`.
pub fn phones_match(a: &str, b: &str) -> bool {
    a.len() >= MIN_PHONE_DIGITS
        && b.len() >= MIN_PHONE_DIGITS
        && (a.contains(b) || b.contains(a))
}

/// First client (in the given order) whose phone matches the chat id.
pub fn match_client<'a>(clients: &'a [Client], chat_id: &str) -> Option<&'a Client> {
    let chat_digits = chat_phone_digits(chat_id);
    clients.iter().find(|client| {
        client
            .phone
            .as_deref()
            .is_some_and(|phone| phones_match(&digits(phone), &chat_digits))
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn parse(json: &str) -> WebhookPayload {
        serde_json::from_str(json).unwrap()
    }

    fn client(name: &str, phone: Option<&str>) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            phone: phone.map(str::to_string),
            company: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_incoming_text_message() {
        let payload = parse(
            r#"{
                "typeWebhook": "incomingMessageReceived",
                "idMessage": "BAE5F4A1",
                "timestamp": 1741770000,
                "senderData": {"chatId": "15550100123@c.us", "senderName": "Jordan"},
                "messageData": {
                    "typeMessage": "textMessage",
                    "textMessageData": {"textMessage": "Hi there"}
                }
            }"#,
        );
        let message = payload.to_message(Utc::now()).unwrap();
        assert_eq!(message.direction, MessageDirection::Inbound);
        assert_eq!(message.chat_id, "15550100123@c.us");
        assert_eq!(message.sender_name.as_deref(), Some("Jordan"));
        assert_eq!(message.external_id.as_deref(), Some("BAE5F4A1"));
        assert_eq!(message.body, "Hi there");
        assert_eq!(
            message.sent_at,
            Utc.timestamp_opt(1_741_770_000, 0).unwrap()
        );
    }

    #[test]
    fn test_extended_text_and_outgoing_types() {
        for kind in ["outgoingMessageReceived", "outgoingAPIMessageReceived"] {
            let payload = parse(&format!(
                r#"{{
                    "typeWebhook": "{kind}",
                    "senderData": {{"chatId": "15550100123@c.us"}},
                    "messageData": {{
                        "typeMessage": "extendedTextMessage",
                        "extendedTextMessageData": {{"text": "See https://agency.example"}}
                    }}
                }}"#
            ));
            let message = payload.to_message(Utc::now()).unwrap();
            assert_eq!(message.direction, MessageDirection::Outbound);
            assert_eq!(message.body, "See https://agency.example");
            assert!(message.external_id.is_none());
        }
    }

    #[test]
    fn test_non_text_message_uses_type_placeholder() {
        let payload = parse(
            r#"{
                "typeWebhook": "incomingMessageReceived",
                "senderData": {"chatId": "15550100123@c.us"},
                "messageData": {"typeMessage": "imageMessage"}
            }"#,
        );
        assert_eq!(payload.to_message(Utc::now()).unwrap().body, "[imageMessage]");
    }

    #[test]
    fn test_status_notifications_are_ignored() {
        let payload = parse(r#"{"typeWebhook": "stateInstanceChanged"}"#);
        assert!(payload.to_message(Utc::now()).is_none());
        let payload = parse(r#"{"typeWebhook": "incomingMessageReceived"}"#);
        assert!(payload.to_message(Utc::now()).is_none());
    }

    #[test]
    fn test_missing_timestamp_falls_back_to_receipt_time() {
        let received = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let payload = parse(
            r#"{"typeWebhook": "incomingMessageReceived", "senderData": {"chatId": "1@c.us"}}"#,
        );
        let message = payload.to_message(received).unwrap();
        assert_eq!(message.sent_at, received);
        assert_eq!(message.body, "[unknown]");
    }

    #[test]
    fn test_phone_matching() {
        assert_eq!(chat_phone_digits("15550100123@c.us"), "15550100123");
        assert!(phones_match(&digits("+1 (555) 010-0123"), "15550100123"));
        assert!(phones_match(&digits("555 0100 123"), "15550100123"));
        assert!(!phones_match("123456", "9991234567"));
        assert!(!phones_match("", "15550100123"));
        assert!(!phones_match("5550199", "15550100123"));
    }

    #[test]
    fn test_first_matching_client_wins() {
        let clients = vec![
            client("No phone", None),
            client("Short", Some("0123")),
            client("First", Some("+1 555 010 0123")),
            client("Second", Some("5550100123")),
        ];
        let matched = match_client(&clients, "15550100123@c.us").unwrap();
        assert_eq!(matched.name, "First");
        assert!(match_client(&clients, "447700900000@c.us").is_none());
    }
}
