//! Agency services shown on the public "Services" page (table `services`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub lang: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub price_from: Option<f64>,
    pub position: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateServiceOffering {
    pub lang: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub price_from: Option<f64>,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateServiceOffering {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub price_from: Option<f64>,
    pub position: Option<i64>,
    pub is_published: Option<bool>,
}

impl ServiceOffering {
    /// Published rows for one language, in display order.
    pub async fn find_published(pool: &SqlitePool, lang: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ServiceOffering>(
            r#"SELECT * FROM services
               WHERE lang = $1 AND is_published = 1
               ORDER BY position ASC, title ASC"#,
        )
        .bind(lang)
        .fetch_all(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool, lang: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ServiceOffering>(
            r#"SELECT * FROM services
               WHERE ($1 IS NULL OR lang = $1)
               ORDER BY lang ASC, position ASC, title ASC"#,
        )
        .bind(lang)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ServiceOffering>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateServiceOffering,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ServiceOffering>(
            r#"INSERT INTO services (id, lang, slug, title, description, icon, price_from, position, is_published)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.lang)
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.icon)
        .bind(data.price_from)
        .bind(data.position)
        .bind(data.is_published)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateServiceOffering,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let slug = data.slug.as_ref().unwrap_or(&existing.slug);
        let title = data.title.as_ref().unwrap_or(&existing.title);
        let description = data.description.as_ref().unwrap_or(&existing.description);
        let icon = data.icon.clone().or(existing.icon);
        let price_from = data.price_from.or(existing.price_from);
        let position = data.position.unwrap_or(existing.position);
        let is_published = data.is_published.unwrap_or(existing.is_published);

        sqlx::query_as::<_, ServiceOffering>(
            r#"UPDATE services
               SET slug = $2, title = $3, description = $4, icon = $5, price_from = $6,
                   position = $7, is_published = $8, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(slug)
        .bind(title)
        .bind(description)
        .bind(icon)
        .bind(price_from)
        .bind(position)
        .bind(is_published)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
