//! WhatsApp relay and webhook ingestion against a real database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use db::{
    models::{
        client::{Client, CreateClient},
        whatsapp::{MessageDirection, WhatsAppChat, WhatsAppMessage},
    },
    test_utils::create_test_pool,
};
use services::services::whatsapp::{
    IngestOutcome, MessagingGateway, SendRequest, SentMessage, WebhookPayload, WhatsAppError,
    ingest, send_and_record,
};
use sqlx::SqlitePool;

#[derive(Default)]
struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<SentMessage, WhatsAppError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id.to_string(), text.to_string()));
        Ok(SentMessage {
            external_id: format!("OUT-{}", sent.len()),
        })
    }
}

struct FailingGateway;

#[async_trait]
impl MessagingGateway for FailingGateway {
    async fn send_text(&self, _chat_id: &str, _text: &str) -> Result<SentMessage, WhatsAppError> {
        Err(WhatsAppError::Gateway {
            status: 502,
            body: "upstream down".to_string(),
        })
    }
}

async fn create_client(pool: &SqlitePool, name: &str, phone: &str) -> Client {
    Client::create(
        pool,
        &CreateClient {
            name: name.to_string(),
            email: None,
            phone: Some(phone.to_string()),
            company: None,
            notes: None,
        },
    )
    .await
    .unwrap()
}

fn incoming(id: &str, chat_id: &str, text: &str) -> WebhookPayload {
    serde_json::from_value(serde_json::json!({
        "typeWebhook": "incomingMessageReceived",
        "idMessage": id,
        "timestamp": 1741770000,
        "senderData": {"chatId": chat_id, "senderName": "Jordan"},
        "messageData": {
            "typeMessage": "textMessage",
            "textMessageData": {"textMessage": text}
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn relay_sends_then_records_outbound_message() {
    let (pool, _dir) = create_test_pool().await;
    let client = create_client(&pool, "Acme", "+1 555 010 0123").await;
    let gateway = RecordingGateway::default();
    let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();

    let outcome = send_and_record(
        &pool,
        &gateway,
        &SendRequest {
            chat_id: Some("15550100123@c.us".to_string()),
            message: Some("Your site is live!".to_string()),
            client_id: Some(client.id.to_string()),
        },
        now,
    )
    .await
    .unwrap();

    assert_eq!(outcome.message_id, "OUT-1");
    assert_eq!(outcome.chat.client_id, Some(client.id));
    assert_eq!(outcome.chat.unread_count, 0);
    assert_eq!(
        gateway.sent.lock().unwrap().as_slice(),
        &[("15550100123@c.us".to_string(), "Your site is live!".to_string())]
    );

    let messages = WhatsAppMessage::find_by_chat(&pool, outcome.chat.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].direction, MessageDirection::Outbound);
    assert_eq!(messages[0].external_id.as_deref(), Some("OUT-1"));
}

#[tokio::test]
async fn relay_failure_records_nothing() {
    let (pool, _dir) = create_test_pool().await;
    let client = create_client(&pool, "Acme", "+1 555 010 0123").await;

    let err = send_and_record(
        &pool,
        &FailingGateway,
        &SendRequest {
            chat_id: Some("15550100123@c.us".to_string()),
            message: Some("Hello".to_string()),
            client_id: Some(client.id.to_string()),
        },
        Utc::now(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WhatsAppError::Gateway { status: 502, .. }));
    assert!(!err.is_client_error());
    assert!(WhatsAppChat::find_all(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn relay_rejects_unknown_client_before_sending() {
    let (pool, _dir) = create_test_pool().await;
    let gateway = RecordingGateway::default();

    let err = send_and_record(
        &pool,
        &gateway,
        &SendRequest {
            chat_id: Some("15550100123@c.us".to_string()),
            message: Some("Hello".to_string()),
            client_id: Some(uuid::Uuid::new_v4().to_string()),
        },
        Utc::now(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WhatsAppError::ClientNotFound(_)));
    assert!(gateway.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_matches_client_and_counts_unread() {
    let (pool, _dir) = create_test_pool().await;
    let first = create_client(&pool, "First", "555 010 0123").await;
    create_client(&pool, "Second", "+1 555 010 0123").await;

    let outcome = ingest(&pool, &incoming("IN-1", "15550100123@c.us", "Hi"), Utc::now())
        .await
        .unwrap();
    let IngestOutcome::Stored { chat, message } = outcome else {
        panic!("expected message to be stored");
    };
    assert_eq!(chat.client_id, Some(first.id));
    assert_eq!(chat.contact_name.as_deref(), Some("Jordan"));
    assert_eq!(chat.unread_count, 1);
    assert_eq!(message.body, "Hi");
    assert_eq!(message.direction, MessageDirection::Inbound);

    ingest(&pool, &incoming("IN-2", "15550100123@c.us", "Anyone?"), Utc::now())
        .await
        .unwrap();
    let chat = WhatsAppChat::find_by_chat_id(&pool, "15550100123@c.us")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(chat.unread_count, 2);
    assert_eq!(chat.last_message.as_deref(), Some("Anyone?"));
}

#[tokio::test]
async fn webhook_redelivery_is_ignored() {
    let (pool, _dir) = create_test_pool().await;
    let payload = incoming("IN-1", "447700900123@c.us", "Hello");

    assert!(matches!(
        ingest(&pool, &payload, Utc::now()).await.unwrap(),
        IngestOutcome::Stored { .. }
    ));
    assert!(matches!(
        ingest(&pool, &payload, Utc::now()).await.unwrap(),
        IngestOutcome::Duplicate
    ));

    let chat = WhatsAppChat::find_by_chat_id(&pool, "447700900123@c.us")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(chat.unread_count, 1);
    assert_eq!(chat.client_id, None);
    assert_eq!(
        WhatsAppMessage::find_by_chat(&pool, chat.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn webhook_ignores_status_notifications() {
    let (pool, _dir) = create_test_pool().await;
    let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
        "typeWebhook": "outgoingMessageStatus",
        "idMessage": "OUT-1",
        "status": "delivered"
    }))
    .unwrap();

    assert!(matches!(
        ingest(&pool, &payload, Utc::now()).await.unwrap(),
        IngestOutcome::Ignored
    ));
    assert!(WhatsAppChat::find_all(&pool).await.unwrap().is_empty());
}
