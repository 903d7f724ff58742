use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// An inquiry submitted through the public contact form.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Message {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateMessage {
    pub client_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub body: String,
}

impl Message {
    pub async fn find_all(pool: &SqlitePool, unread_only: bool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"SELECT * FROM messages
               WHERE ($1 = 0 OR is_read = 0)
               ORDER BY created_at DESC"#,
        )
        .bind(unread_only)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateMessage) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"INSERT INTO messages (id, client_id, name, email, phone, subject, body)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.client_id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.subject)
        .bind(&data.body)
        .fetch_one(pool)
        .await
    }

    pub async fn set_read(
        pool: &SqlitePool,
        id: Uuid,
        is_read: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Message>("UPDATE messages SET is_read = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(is_read)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_unread(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE is_read = 0")
            .fetch_one(pool)
            .await
    }
}
