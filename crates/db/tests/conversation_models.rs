//! Integration tests for WhatsApp chat storage and chat-widget history.

use std::str::FromStr;

use chrono::{TimeZone, Utc};
use db::models::{
    bot_message::{BotMessage, BotRole},
    client::{Client, CreateClient},
    whatsapp::{ChatActivity, MessageDirection, NewWhatsAppMessage, WhatsAppChat, WhatsAppMessage},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use tempfile::TempDir;

async fn setup_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let options =
        SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.to_string_lossy()))
            .expect("Invalid database URL")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to create pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (pool, temp_dir)
}

#[tokio::test]
async fn chat_activity_accumulates_unread_and_keeps_client() {
    let (pool, _dir) = setup_test_pool().await;
    let client = Client::create(
        &pool,
        &CreateClient {
            name: "Acme".to_string(),
            email: None,
            phone: Some("+1 555 0100".to_string()),
            company: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    let at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let first = WhatsAppChat::upsert_activity(
        &pool,
        &ChatActivity {
            chat_id: "15550100@c.us",
            client_id: Some(client.id),
            contact_name: Some("Acme Support"),
            last_message: "Hi",
            at,
            unread_increment: 1,
        },
    )
    .await
    .unwrap();

    let second = WhatsAppChat::upsert_activity(
        &pool,
        &ChatActivity {
            chat_id: "15550100@c.us",
            client_id: None,
            contact_name: None,
            last_message: "Are you there?",
            at: at + chrono::Duration::minutes(2),
            unread_increment: 1,
        },
    )
    .await
    .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.unread_count, 2);
    assert_eq!(second.client_id, Some(client.id));
    assert_eq!(second.contact_name.as_deref(), Some("Acme Support"));
    assert_eq!(second.last_message.as_deref(), Some("Are you there?"));
    assert_eq!(WhatsAppChat::count_unread(&pool).await.unwrap(), 1);

    assert_eq!(WhatsAppChat::mark_read(&pool, first.id).await.unwrap(), 1);
    let chat = WhatsAppChat::find_by_chat_id(&pool, "15550100@c.us")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(chat.unread_count, 0);
}

#[tokio::test]
async fn message_insert_ignores_repeated_external_id() {
    let (pool, _dir) = setup_test_pool().await;
    let at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let chat = WhatsAppChat::upsert_activity(
        &pool,
        &ChatActivity {
            chat_id: "4915112345678@c.us",
            client_id: None,
            contact_name: None,
            last_message: "Hello",
            at,
            unread_increment: 1,
        },
    )
    .await
    .unwrap();

    let message = NewWhatsAppMessage {
        chat_row_id: chat.id,
        external_id: Some("BAE5F4A1"),
        direction: MessageDirection::Inbound,
        body: "Hello",
        sent_at: at,
    };

    assert!(!WhatsAppMessage::external_id_exists(&pool, "BAE5F4A1").await.unwrap());
    let stored = WhatsAppMessage::insert(&pool, &message).await.unwrap();
    assert!(stored.is_some());
    assert!(WhatsAppMessage::external_id_exists(&pool, "BAE5F4A1").await.unwrap());
    assert!(WhatsAppMessage::insert(&pool, &message).await.unwrap().is_none());

    let reply = NewWhatsAppMessage {
        chat_row_id: chat.id,
        external_id: None,
        direction: MessageDirection::Outbound,
        body: "Hi, how can we help?",
        sent_at: at + chrono::Duration::minutes(1),
    };
    WhatsAppMessage::insert(&pool, &reply).await.unwrap();

    let history = WhatsAppMessage::find_by_chat(&pool, chat.id).await.unwrap();
    let directions: Vec<_> = history.iter().map(|m| m.direction).collect();
    assert_eq!(
        directions,
        vec![MessageDirection::Inbound, MessageDirection::Outbound]
    );
}

#[tokio::test]
async fn bot_exchange_is_stored_in_order() {
    let (pool, _dir) = setup_test_pool().await;
    let ids =
        BotMessage::append_exchange(&pool, "session-a", "What do you build?", "Websites and apps.")
            .await
            .unwrap();
    BotMessage::append_exchange(&pool, "session-b", "Prices?", "From $800.")
        .await
        .unwrap();

    let history = BotMessage::find_by_session(&pool, "session-a").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, BotRole::User);
    assert_eq!(history[0].content, "What do you build?");
    assert_eq!(history[1].role, BotRole::Assistant);
    assert_eq!(ids, vec![history[0].id, history[1].id]);

    let latest = BotMessage::find_latest_per_session(&pool).await.unwrap();
    assert_eq!(latest.len(), 2);
    assert!(latest.iter().all(|m| m.role == BotRole::Assistant));
}
