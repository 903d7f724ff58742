use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Faq {
    pub id: Uuid,
    pub lang: String,
    pub question: String,
    pub answer: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateFaq {
    pub lang: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateFaq {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i64>,
}

impl Faq {
    pub async fn find_all(pool: &SqlitePool, lang: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Faq>(
            r#"SELECT * FROM faqs
               WHERE ($1 IS NULL OR lang = $1)
               ORDER BY lang ASC, position ASC, created_at ASC"#,
        )
        .bind(lang)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateFaq) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Faq>(
            r#"INSERT INTO faqs (id, lang, question, answer, position)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.lang)
        .bind(&data.question)
        .bind(&data.answer)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateFaq) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let question = data.question.as_ref().unwrap_or(&existing.question);
        let answer = data.answer.as_ref().unwrap_or(&existing.answer);
        let position = data.position.unwrap_or(existing.position);

        sqlx::query_as::<_, Faq>(
            r#"UPDATE faqs
               SET question = $2, answer = $3, position = $4,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(question)
        .bind(answer)
        .bind(position)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
