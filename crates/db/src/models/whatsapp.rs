//! WhatsApp conversations relayed through the messaging gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "message_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

/// One conversation per gateway chat id (e.g. `79001234567@c.us`).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct WhatsAppChat {
    pub id: Uuid,
    pub chat_id: String,
    pub client_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct WhatsAppMessage {
    pub id: Uuid,
    /// Row id of the owning [`WhatsAppChat`], not the gateway chat id.
    pub chat_id: Uuid,
    pub external_id: Option<String>,
    pub direction: MessageDirection,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Latest activity to fold into a chat row.
#[derive(Debug, Clone)]
pub struct ChatActivity<'a> {
    pub chat_id: &'a str,
    pub client_id: Option<Uuid>,
    pub contact_name: Option<&'a str>,
    pub last_message: &'a str,
    pub at: DateTime<Utc>,
    pub unread_increment: i64,
}

#[derive(Debug, Clone)]
pub struct NewWhatsAppMessage<'a> {
    pub chat_row_id: Uuid,
    pub external_id: Option<&'a str>,
    pub direction: MessageDirection,
    pub body: &'a str,
    pub sent_at: DateTime<Utc>,
}

impl WhatsAppChat {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, WhatsAppChat>(
            r#"SELECT * FROM whatsapp_chats
               ORDER BY last_message_at IS NULL, last_message_at DESC, created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, WhatsAppChat>("SELECT * FROM whatsapp_chats WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_chat_id(
        pool: &SqlitePool,
        chat_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, WhatsAppChat>("SELECT * FROM whatsapp_chats WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the chat on first contact, otherwise refresh its preview.
    /// A known client/contact name is never overwritten with NULL.
    pub async fn upsert_activity<'e, E>(
        executor: E,
        activity: &ChatActivity<'_>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, WhatsAppChat>(
            r#"INSERT INTO whatsapp_chats
                   (id, chat_id, client_id, contact_name, last_message, last_message_at, unread_count)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (chat_id) DO UPDATE SET
                   client_id = COALESCE(excluded.client_id, whatsapp_chats.client_id),
                   contact_name = COALESCE(excluded.contact_name, whatsapp_chats.contact_name),
                   last_message = excluded.last_message,
                   last_message_at = excluded.last_message_at,
                   unread_count = whatsapp_chats.unread_count + excluded.unread_count,
                   updated_at = datetime('now', 'subsec')
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(activity.chat_id)
        .bind(activity.client_id)
        .bind(activity.contact_name)
        .bind(activity.last_message)
        .bind(activity.at)
        .bind(activity.unread_increment)
        .fetch_one(executor)
        .await
    }

    pub async fn mark_read(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE whatsapp_chats SET unread_count = 0, updated_at = datetime('now', 'subsec') WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_unread(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM whatsapp_chats WHERE unread_count > 0")
            .fetch_one(pool)
            .await
    }
}

impl WhatsAppMessage {
    pub async fn find_by_chat(
        pool: &SqlitePool,
        chat_row_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, WhatsAppMessage>(
            "SELECT * FROM whatsapp_messages WHERE chat_id = $1 ORDER BY sent_at ASC, rowid ASC",
        )
        .bind(chat_row_id)
        .fetch_all(pool)
        .await
    }

    pub async fn external_id_exists<'e, E>(
        executor: E,
        external_id: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM whatsapp_messages WHERE external_id = $1)",
        )
        .bind(external_id)
        .fetch_one(executor)
        .await?;
        Ok(exists != 0)
    }

    /// Returns `None` when a message with the same `external_id` was
    /// already stored.
    pub async fn insert<'e, E>(
        executor: E,
        message: &NewWhatsAppMessage<'_>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, WhatsAppMessage>(
            r#"INSERT INTO whatsapp_messages (id, chat_id, external_id, direction, body, sent_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (external_id) DO NOTHING
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(message.chat_row_id)
        .bind(message.external_id)
        .bind(message.direction)
        .bind(message.body)
        .bind(message.sent_at)
        .fetch_optional(executor)
        .await
    }
}
