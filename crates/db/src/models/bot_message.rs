use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "bot_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BotRole {
    User,
    Assistant,
}

/// A persisted turn of the website chat widget.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct BotMessage {
    pub id: Uuid,
    pub session_id: String,
    pub role: BotRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl BotMessage {
    pub async fn find_by_session(
        pool: &SqlitePool,
        session_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BotMessage>(
            "SELECT * FROM bot_messages WHERE session_id = $1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    /// Most recent sessions first, one row per session (its latest message).
    pub async fn find_latest_per_session(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BotMessage>(
            r#"SELECT b.* FROM bot_messages b
               WHERE b.rowid = (
                   SELECT MAX(rowid) FROM bot_messages WHERE session_id = b.session_id
               )
               ORDER BY b.created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Append the user turn and the assistant reply together, returning the
    /// new row ids in insertion order.
    pub async fn append_exchange(
        pool: &SqlitePool,
        session_id: &str,
        user_content: &str,
        reply: &str,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut ids = Vec::with_capacity(2);
        for (role, content) in [(BotRole::User, user_content), (BotRole::Assistant, reply)] {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO bot_messages (id, session_id, role, content) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(session_id)
            .bind(role)
            .bind(content)
            .execute(&mut *tx)
            .await?;
            ids.push(id);
        }
        tx.commit().await?;
        Ok(ids)
    }
}
