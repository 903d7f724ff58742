use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A "why choose us" card on the home page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Benefit {
    pub id: Uuid,
    pub lang: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateBenefit {
    pub lang: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateBenefit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub position: Option<i64>,
}

impl Benefit {
    pub async fn find_all(pool: &SqlitePool, lang: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Benefit>(
            r#"SELECT * FROM benefits
               WHERE ($1 IS NULL OR lang = $1)
               ORDER BY lang ASC, position ASC, title ASC"#,
        )
        .bind(lang)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Benefit>("SELECT * FROM benefits WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateBenefit) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Benefit>(
            r#"INSERT INTO benefits (id, lang, title, description, icon, position)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.lang)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.icon)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateBenefit,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let title = data.title.as_ref().unwrap_or(&existing.title);
        let description = data.description.as_ref().unwrap_or(&existing.description);
        let icon = data.icon.clone().or(existing.icon);
        let position = data.position.unwrap_or(existing.position);

        sqlx::query_as::<_, Benefit>(
            r#"UPDATE benefits
               SET title = $2, description = $3, icon = $4, position = $5,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(icon)
        .bind(position)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM benefits WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
