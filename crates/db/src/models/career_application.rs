use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Hiring pipeline stage.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    New,
    Reviewing,
    Interview,
    Offer,
    Hired,
    Rejected,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CareerApplication {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateCareerApplication {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
}

/// Admin-side review of an application.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateCareerApplication {
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
}

impl CareerApplication {
    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CareerApplication>(
            r#"SELECT * FROM career_applications
               WHERE ($1 IS NULL OR status = $1)
               ORDER BY created_at DESC"#,
        )
        .bind(status)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CareerApplication>("SELECT * FROM career_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCareerApplication,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CareerApplication>(
            r#"INSERT INTO career_applications (id, full_name, email, phone, position, resume_url, cover_letter)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.full_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.position)
        .bind(&data.resume_url)
        .bind(&data.cover_letter)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCareerApplication,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let status = data.status.unwrap_or(existing.status);
        let notes = data.notes.clone().or(existing.notes);

        sqlx::query_as::<_, CareerApplication>(
            r#"UPDATE career_applications
               SET status = $2, notes = $3, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .bind(notes)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM career_applications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_new(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM career_applications WHERE status = 'new'")
            .fetch_one(pool)
            .await
    }
}
